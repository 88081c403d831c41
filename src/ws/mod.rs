//! WebSocket layer: connection registry, per-channel message routing and
//! topic subscriptions.
//!
//! Two endpoints are served: `/ws/status` for box reachability and drone
//! telemetry, and `/ws/orders` for order status changes. Each endpoint owns
//! one [`ConnectionRegistry`].

pub mod connection;
pub mod connection_id;
pub mod handler;
pub mod messages;
pub mod orders;
pub mod registry;
pub mod status;

pub use connection_id::ConnectionId;
pub use orders::OrderChannel;
pub use registry::{ConnectionRegistry, Topic};
pub use status::StatusChannel;
