//! Device relay: the line protocol spoken by the box controller.
//!
//! Request: `<COMMAND>\n` as ASCII. Response: one ASCII line, successful
//! iff it starts with `OK:`. Each exchange uses its own TCP connection.

pub mod client;
pub mod command;

pub use client::{RelayClient, RelaySettings};
pub use command::{Command, CommandResult, DeviceReply, RelayFailure};
