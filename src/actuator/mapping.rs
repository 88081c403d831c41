//! Static actuator → command table.
//!
//! Each physical subsystem of the box is driven by exactly one command per
//! desired state. The table is built once at startup and only read
//! afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::GatewayError;
use crate::relay::Command;

/// Number of battery slots in the box.
pub const SLOT_COUNT: u8 = 3;

/// Battery slot number, `1..=SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slot(u8);

impl Slot {
    /// All slots, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SLOT_COUNT).map(Self)
    }

    /// Returns the slot number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Slot {
    type Error = GatewayError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if (1..=SLOT_COUNT).contains(&n) {
            Ok(Self(n))
        } else {
            Err(GatewayError::InvalidSlot(n))
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A controllable subsystem of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    /// Roof: `true` opens.
    Roof,
    /// Drone centering mechanism: `true` moves to center, `false` to edge.
    Position,
    /// Lift table: `true` raises.
    Table,
    /// Service hatch: `true` opens.
    Hatch,
    /// Battery inside the drone: `true` installs.
    DroneBattery,
    /// Storage battery slot: `true` installs the battery into the slot.
    Battery(Slot),
    /// Charger of a storage slot: `true` switches on.
    Charger(Slot),
    /// Emergency stop; only the `true` state exists.
    Stop,
    /// Status query; only the `true` state exists.
    Status,
}

impl Actuator {
    /// Every actuator in the box.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Roof,
            Self::Position,
            Self::Table,
            Self::Hatch,
            Self::DroneBattery,
        ]
        .into_iter()
        .chain(Slot::all().map(Self::Battery))
        .chain(Slot::all().map(Self::Charger))
        .chain([Self::Stop, Self::Status])
    }

    /// Returns `true` for actuators with a single command (stop, status).
    #[must_use]
    pub const fn is_momentary(self) -> bool {
        matches!(self, Self::Stop | Self::Status)
    }

    /// Human-readable description of the action taken for `state`.
    #[must_use]
    pub fn describe(self, state: bool) -> String {
        match (self, state) {
            (Self::Roof, true) => "open roof".to_string(),
            (Self::Roof, false) => "close roof".to_string(),
            (Self::Position, true) => "move drone to center".to_string(),
            (Self::Position, false) => "move drone to edge".to_string(),
            (Self::Table, true) => "raise table".to_string(),
            (Self::Table, false) => "lower table".to_string(),
            (Self::Hatch, true) => "open hatch".to_string(),
            (Self::Hatch, false) => "close hatch".to_string(),
            (Self::DroneBattery, true) => "install drone battery".to_string(),
            (Self::DroneBattery, false) => "remove drone battery".to_string(),
            (Self::Battery(slot), true) => format!("install battery {slot}"),
            (Self::Battery(slot), false) => format!("remove battery {slot}"),
            (Self::Charger(slot), true) => format!("switch on charger {slot}"),
            (Self::Charger(slot), false) => format!("switch off charger {slot}"),
            (Self::Stop, _) => "stop all actuators".to_string(),
            (Self::Status, _) => "query box status".to_string(),
        }
    }
}

/// Immutable lookup table from `(actuator, desired state)` to command.
#[derive(Debug, Clone)]
pub struct ActuatorMapping {
    commands: HashMap<(Actuator, bool), Command>,
}

impl ActuatorMapping {
    /// Builds the table used by the box firmware.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a command token is
    /// invalid, which would indicate a bug in the table itself.
    pub fn standard() -> Result<Self, GatewayError> {
        let mut entries: Vec<(Actuator, bool, String)> = vec![
            (Actuator::Roof, true, "ROOF_OPEN".to_string()),
            (Actuator::Roof, false, "ROOF_CLOSE".to_string()),
            (Actuator::Position, true, "POS_CENTER".to_string()),
            (Actuator::Position, false, "POS_EDGE".to_string()),
            (Actuator::Table, true, "TABLE_UP".to_string()),
            (Actuator::Table, false, "TABLE_DOWN".to_string()),
            (Actuator::Hatch, true, "HATCH_OPEN".to_string()),
            (Actuator::Hatch, false, "HATCH_CLOSE".to_string()),
            (Actuator::DroneBattery, true, "DBATON".to_string()),
            (Actuator::DroneBattery, false, "DBATOFF".to_string()),
            (Actuator::Stop, true, "STOP".to_string()),
            (Actuator::Status, true, "STATUS".to_string()),
        ];
        for slot in Slot::all() {
            entries.push((Actuator::Battery(slot), true, format!("B{slot}PUTON")));
            entries.push((Actuator::Battery(slot), false, format!("B{slot}PUTOFF")));
            entries.push((Actuator::Charger(slot), true, format!("B{slot}ON")));
            entries.push((Actuator::Charger(slot), false, format!("B{slot}OFF")));
        }

        let mut commands = HashMap::with_capacity(entries.len());
        for (actuator, state, token) in entries {
            commands.insert((actuator, state), Command::new(token)?);
        }
        Ok(Self { commands })
    }

    /// Looks up the command for driving `actuator` to `state`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the actuator has no
    /// command for that state (e.g. `stop` with `false`).
    pub fn command_for(&self, actuator: Actuator, state: bool) -> Result<&Command, GatewayError> {
        self.commands.get(&(actuator, state)).ok_or_else(|| {
            GatewayError::InvalidRequest(format!(
                "no command to {} with state {state}",
                actuator.describe(state)
            ))
        })
    }

    /// Returns the number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
