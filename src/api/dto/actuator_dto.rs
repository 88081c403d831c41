//! Actuator command acknowledgments.

use serde::Serialize;
use utoipa::ToSchema;

use crate::actuator::{Actuator, ActuatorOutcome};
use crate::monitor::StatusSnapshot;

/// Response body for a successful actuator command.
///
/// Exactly one of the `is*` fields is present, naming the requested state
/// in the actuator's own terms.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActuatorResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Roof or hatch: requested open state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    /// Position: requested center (`true`) or edge (`false`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_center: Option<bool>,
    /// Table: requested raised state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_up: Option<bool>,
    /// Drone battery or slot battery: requested installed state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_install: Option<bool>,
    /// Charger: requested power state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    /// Battery slot, for slot and charger commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,
    /// Command token sent to the controller.
    pub command: String,
    /// Raw controller reply.
    pub linuxcnc_response: String,
}

impl From<ActuatorOutcome> for ActuatorResponse {
    fn from(outcome: ActuatorOutcome) -> Self {
        let mut response = Self {
            success: true,
            message: outcome.message,
            is_open: None,
            is_center: None,
            is_up: None,
            is_install: None,
            is_on: None,
            battery: None,
            command: outcome.command,
            linuxcnc_response: outcome.response,
        };
        let state = Some(outcome.state);
        match outcome.actuator {
            Actuator::Roof | Actuator::Hatch => response.is_open = state,
            Actuator::Position => response.is_center = state,
            Actuator::Table => response.is_up = state,
            Actuator::DroneBattery => response.is_install = state,
            Actuator::Battery(slot) => {
                response.is_install = state;
                response.battery = Some(slot.number());
            }
            Actuator::Charger(slot) => {
                response.is_on = state;
                response.battery = Some(slot.number());
            }
            Actuator::Stop | Actuator::Status => {}
        }
        response
    }
}

/// Response body for `GET /api/v1/box/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxStatusResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Command token sent to the controller.
    pub command: String,
    /// Raw controller status reply.
    pub linuxcnc_response: String,
    /// Latest reachability probe, if the poller has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachability: Option<StatusSnapshot>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::actuator::Slot;

    fn outcome(actuator: Actuator, state: bool) -> ActuatorOutcome {
        ActuatorOutcome {
            actuator,
            state,
            message: "ok".to_string(),
            command: "CMD".to_string(),
            response: "OK:CMD".to_string(),
        }
    }

    #[test]
    fn battery_echo_uses_is_install() {
        let Ok(slot) = Slot::try_from(1) else {
            panic!("slot 1 exists");
        };
        let json = serde_json::to_value(ActuatorResponse::from(outcome(Actuator::Battery(slot), true)))
            .unwrap_or_default();
        assert_eq!(json.get("isInstall"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(json.get("battery"), Some(&serde_json::json!(1)));
        assert_eq!(
            json.get("linuxcncResponse").and_then(|v| v.as_str()),
            Some("OK:CMD")
        );
        assert!(json.get("isOn").is_none());
    }

    #[test]
    fn each_actuator_echoes_its_own_field() {
        let cases = [
            (Actuator::Roof, "isOpen"),
            (Actuator::Hatch, "isOpen"),
            (Actuator::Position, "isCenter"),
            (Actuator::Table, "isUp"),
            (Actuator::DroneBattery, "isInstall"),
        ];
        for (actuator, field) in cases {
            let json = serde_json::to_value(ActuatorResponse::from(outcome(actuator, false)))
                .unwrap_or_default();
            assert_eq!(json.get(field), Some(&serde_json::Value::Bool(false)), "{actuator:?}");
        }
    }
}
