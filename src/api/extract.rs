//! Request extractors shared by the actuator endpoints.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};

use crate::error::GatewayError;

/// Desired actuator state, sent as a bare JSON boolean body (`true` /
/// `false`).
///
/// An empty body or anything other than a JSON boolean is rejected with
/// [`GatewayError::InvalidRequest`] before the handler runs, so a malformed
/// request never reaches the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredState(pub bool);

impl<S> FromRequest<S> for DesiredState
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
        parse_state(&body).map(Self)
    }
}

fn parse_state(body: &[u8]) -> Result<bool, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::InvalidRequest(
            "request body must be a JSON boolean".to_string(),
        ));
    }
    serde_json::from_slice::<bool>(body).map_err(|e| {
        GatewayError::InvalidRequest(format!("request body must be a JSON boolean: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_booleans() {
        assert!(matches!(parse_state(b"true"), Ok(true)));
        assert!(matches!(parse_state(b" false\n"), Ok(false)));
    }

    #[test]
    fn rejects_everything_else() {
        for body in [&b""[..], b"  ", b"1", b"\"true\"", b"{\"state\":true}", b"tru"] {
            assert!(
                matches!(parse_state(body), Err(GatewayError::InvalidRequest(_))),
                "accepted {body:?}"
            );
        }
    }
}
