//! Command tokens, device replies and relay outcomes.
//!
//! A [`Command`] is an opaque ASCII token sent verbatim to the box
//! controller. The controller answers with a single line of text; a reply
//! beginning with [`SUCCESS_PREFIX`] is an acknowledgment, anything else is
//! a rejection. Transport problems never reach the controller's firmware and
//! are reported as [`RelayFailure`] variants of their own.

use std::fmt;
use std::time::Duration;

use crate::error::GatewayError;

/// Prefix the controller uses to acknowledge a command.
pub const SUCCESS_PREFIX: &str = "OK:";

/// Prefix of the diagnostic strings synthesized for transport failures.
pub const ERROR_PREFIX: &str = "ERROR:";

/// Outcome of one relay exchange.
pub type CommandResult = Result<DeviceReply, RelayFailure>;

/// A validated controller command (non-empty ASCII, no line breaks).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    /// Parses a command token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the token is empty,
    /// contains non-ASCII characters or contains a line break.
    pub fn new(token: impl Into<String>) -> Result<Self, GatewayError> {
        let token = token.into();
        if token.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "command must not be empty".to_string(),
            ));
        }
        if !token.is_ascii() {
            return Err(GatewayError::InvalidRequest(format!(
                "command must be ASCII: {token:?}"
            )));
        }
        if token.contains(['\r', '\n']) {
            return Err(GatewayError::InvalidRequest(
                "command must not contain line breaks".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// Returns the command token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the bytes written to the wire: the token followed by `\n`.
    #[must_use]
    pub fn to_frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.0.len() + 1);
        frame.extend_from_slice(self.0.as_bytes());
        frame.push(b'\n');
        frame
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Acknowledgment text returned by the controller (always starts with `OK:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReply(String);

impl DeviceReply {
    /// Returns the raw reply text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the reply, returning its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a relay exchange did not produce an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayFailure {
    /// The TCP connection was not established in time.
    #[error("connection timeout after {} ms", .0.as_millis())]
    ConnectTimeout(Duration),

    /// The controller accepted the command but did not answer in time.
    #[error("read timeout after {} ms", .0.as_millis())]
    ReadTimeout(Duration),

    /// Socket-level failure (refused, reset, unreachable, ...).
    #[error("socket error: {0}")]
    Transport(String),

    /// The controller answered without the success prefix.
    #[error("device rejected command: {0:?}")]
    Rejected(String),
}

impl RelayFailure {
    /// Returns `true` for connect and read timeouts.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout(_) | Self::ReadTimeout(_))
    }

    /// Returns the text reported as the device response.
    ///
    /// Rejections carry the controller's own reply; transport failures are
    /// rendered as `ERROR: <reason>` lines.
    #[must_use]
    pub fn wire_text(&self) -> String {
        match self {
            Self::Rejected(raw) => raw.clone(),
            other => format!("{ERROR_PREFIX} {other}"),
        }
    }
}

/// Decodes a controller reply: bytes outside ASCII become `?`, surrounding
/// whitespace is trimmed.
#[must_use]
pub fn decode_reply(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
        .collect();
    text.trim().to_string()
}

/// Classifies decoded reply text as acknowledgment or rejection.
///
/// # Errors
///
/// Returns [`RelayFailure::Rejected`] when the text does not start with
/// [`SUCCESS_PREFIX`].
pub fn interpret_reply(text: String) -> CommandResult {
    if text.starts_with(SUCCESS_PREFIX) {
        Ok(DeviceReply(text))
    } else {
        Err(RelayFailure::Rejected(text))
    }
}
