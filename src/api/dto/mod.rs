//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire.

pub mod actuator_dto;
pub mod order_dto;
pub mod system_dto;

pub use actuator_dto::*;
pub use order_dto::*;
pub use system_dto::*;
