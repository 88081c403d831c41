//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::relay::RelayFailure;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": 3101,
///     "message": "failed to open roof: read timeout after 5000 ms",
///     "command": "ROOF_OPEN",
///     "linuxcncResponse": "ERROR: read timeout after 5000 ms"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Numeric error code (see ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Command sent to the controller, for relay failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Raw controller reply (or synthesized `ERROR:` line), for relay failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linuxcnc_response: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                   |
/// |-----------|-----------------|-------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request               |
/// | 2000–2999 | Not Found       | 404 Not Found                 |
/// | 3000–3099 | Server          | 500 Internal Server Error     |
/// | 3100–3199 | Device relay    | 502 Bad Gateway / 504 Timeout |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed; nothing was sent to the device.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Battery slot outside `1..=3`.
    #[error("invalid battery slot: {0} (expected 1-3)")]
    InvalidSlot(u8),

    /// Order with the given ID was not found.
    #[error("order not found: {0}")]
    OrderNotFound(i64),

    /// No telemetry has been received for the given drone.
    #[error("no telemetry for drone {0}")]
    TelemetryNotFound(String),

    /// The controller exchange failed.
    #[error("{message}: {failure}")]
    CommandFailed {
        /// Actuator-specific description of what was attempted.
        message: String,
        /// Command token that was sent.
        command: String,
        /// What went wrong.
        failure: RelayFailure,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidSlot(_) => 1002,
            Self::OrderNotFound(_) => 2001,
            Self::TelemetryNotFound(_) => 2002,
            Self::CommandFailed { failure, .. } => match failure {
                RelayFailure::ConnectTimeout(_) | RelayFailure::ReadTimeout(_) => 3101,
                RelayFailure::Transport(_) => 3102,
                RelayFailure::Rejected(_) => 3103,
            },
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidSlot(_) => StatusCode::BAD_REQUEST,
            Self::OrderNotFound(_) | Self::TelemetryNotFound(_) => StatusCode::NOT_FOUND,
            Self::CommandFailed { failure, .. } => {
                if failure.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (command, linuxcnc_response) = match &self {
            Self::CommandFailed {
                command, failure, ..
            } => (Some(command.clone()), Some(failure.wire_text())),
            _ => (None, None),
        };
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
                command,
                linuxcnc_response,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn relay_failures_map_to_gateway_statuses() {
        let timeout = GatewayError::CommandFailed {
            message: "failed to open roof".to_string(),
            command: "ROOF_OPEN".to_string(),
            failure: RelayFailure::ConnectTimeout(Duration::from_secs(3)),
        };
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.error_code(), 3101);

        let rejected = GatewayError::CommandFailed {
            message: "failed to open roof".to_string(),
            command: "ROOF_OPEN".to_string(),
            failure: RelayFailure::Rejected("NAK".to_string()),
        };
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(rejected.error_code(), 3103);
    }

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(
            GatewayError::InvalidSlot(7).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn command_failure_body_carries_raw_reply() {
        let err = GatewayError::CommandFailed {
            message: "failed to install battery 1".to_string(),
            command: "B1PUTON".to_string(),
            failure: RelayFailure::Rejected("ERR:SLOT_FULL".to_string()),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("invalid json");
        };
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["command"], "B1PUTON");
        assert_eq!(json["error"]["linuxcncResponse"], "ERR:SLOT_FULL");
        assert_eq!(json["error"]["code"], 3103);
    }
}
