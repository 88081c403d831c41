//! Actuator facade: semantic request → command → relay → outcome.

use std::sync::Arc;

use super::mapping::{Actuator, ActuatorMapping};
use crate::activity::{ActivityLog, Severity};
use crate::error::GatewayError;
use crate::relay::RelayClient;

const ACTOR: &str = "dronebox";

/// Successful actuator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorOutcome {
    /// Actuator that was driven.
    pub actuator: Actuator,
    /// Requested state, echoed back.
    pub state: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Command token that was sent.
    pub command: String,
    /// Raw controller acknowledgment.
    pub response: String,
}

/// Stateless coordinator for actuator commands.
///
/// Holds no notion of the current physical position: every call sends the
/// mapped command, so repeating a request repeats the same command.
#[derive(Debug, Clone)]
pub struct ActuatorService {
    relay: Arc<RelayClient>,
    mapping: Arc<ActuatorMapping>,
    activity: Arc<dyn ActivityLog>,
}

impl ActuatorService {
    /// Creates a new `ActuatorService`.
    #[must_use]
    pub fn new(
        relay: Arc<RelayClient>,
        mapping: Arc<ActuatorMapping>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            relay,
            mapping,
            activity,
        }
    }

    /// Returns the command table.
    #[must_use]
    pub fn mapping(&self) -> &ActuatorMapping {
        &self.mapping
    }

    /// Drives `actuator` to `state` with a single relay exchange.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the actuator has no
    /// command for `state` (checked before any network I/O), and
    /// [`GatewayError::CommandFailed`] if the exchange fails.
    pub async fn execute(
        &self,
        actuator: Actuator,
        state: bool,
    ) -> Result<ActuatorOutcome, GatewayError> {
        let command = self.mapping.command_for(actuator, state)?;
        let action = actuator.describe(state);

        match self.relay.send(command).await {
            Ok(reply) => {
                let message = format!("{} succeeded", capitalize(&action));
                self.activity.record(ACTOR, &message, Severity::Info);
                Ok(ActuatorOutcome {
                    actuator,
                    state,
                    message,
                    command: command.as_str().to_string(),
                    response: reply.into_inner(),
                })
            }
            Err(failure) => {
                let message = format!("failed to {action}");
                self.activity.record(
                    ACTOR,
                    &format!("{message} ({})", failure.wire_text()),
                    Severity::Error,
                );
                Err(GatewayError::CommandFailed {
                    message,
                    command: command.as_str().to_string(),
                    failure,
                })
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
