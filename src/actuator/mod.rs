//! Actuator layer: the command table and the facade that drives it.

pub mod mapping;
pub mod service;

pub use mapping::{Actuator, ActuatorMapping, SLOT_COUNT, Slot};
pub use service::{ActuatorOutcome, ActuatorService};
