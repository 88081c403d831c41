//! # dronebox-gateway
//!
//! REST API and WebSocket gateway for a drone delivery box.
//!
//! Every actuator of the box (roof, centering mechanism, table, hatch,
//! batteries, chargers) is exposed as a boolean HTTP endpoint. A request
//! is mapped to one ASCII command, sent to the box controller in a single
//! TCP exchange, and the controller's reply is echoed back. Independently,
//! a background poller probes the controller and pushes reachability
//! snapshots to WebSocket clients, while order status changes and drone
//! telemetry are fanned out to the clients subscribed to them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Channels (ws/) ──── ConnectionRegistry ×2
//!     │                              ▲          ▲
//!     ├── ActuatorService (actuator/)│          │
//!     │       │                      │          │
//!     │   RelayClient (relay/)   OrderService  TelemetryService
//!     │       │                  (orders/)     (telemetry)
//!     │       ▼                      │
//!     │   Box controller (TCP)   OrderStore
//!     │       ▲
//!     └── ReachabilityPoller (monitor/)
//! ```

pub mod activity;
pub mod actuator;
pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod orders;
pub mod relay;
pub mod telemetry;
pub mod ws;
