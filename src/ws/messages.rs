//! WebSocket message types for the status and order channels.
//!
//! Every frame is a JSON object with a `type` discriminator. Server frames
//! carry an ISO-8601 `timestamp`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ConnectionId;
use crate::monitor::StatusSnapshot;
use crate::orders::{Order, OrderStatus};
use crate::telemetry::TelemetryReport;

/// Payload of a `status_update` frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusData {
    /// Controller reachability, produced by the background poller.
    Reachability(StatusSnapshot),
    /// Latest telemetry report of a drone.
    Telemetry(TelemetryReport),
}

/// Server → client frames on the status channel (`/ws/status`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StatusMessage {
    /// Sent once after the connection is registered.
    Welcome {
        /// Id assigned to this connection.
        connection_id: ConnectionId,
        /// Greeting text.
        message: String,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Acknowledges a drone subscription.
    Subscribed {
        /// Subscribed drone.
        drone_id: String,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Acknowledges a drone unsubscription.
    Unsubscribed {
        /// Drone no longer followed.
        drone_id: String,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Box reachability or drone telemetry.
    StatusUpdate {
        /// Drone the update belongs to; absent for box-wide updates.
        #[serde(skip_serializing_if = "Option::is_none")]
        drone_id: Option<String>,
        /// Update payload.
        data: StatusData,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// The client sent something the server could not act on.
    Error {
        /// What went wrong.
        message: String,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
}

impl StatusMessage {
    /// Builds a `status_update` frame stamped with the current time.
    #[must_use]
    pub fn update(drone_id: Option<String>, data: StatusData) -> Self {
        Self::StatusUpdate {
            drone_id,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Builds an `error` frame stamped with the current time.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Client → server frames on the status channel.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StatusCommand {
    /// Follow one drone.
    Subscribe {
        /// Drone to follow.
        drone_id: String,
    },
    /// Stop following one drone.
    Unsubscribe {
        /// Drone to drop.
        drone_id: String,
    },
}

/// Server → client frames on the order channel (`/ws/orders`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OrderMessage {
    /// Snapshot of every order; sent on connect and on request.
    AllOrdersStatus {
        /// Current orders.
        orders: Vec<Order>,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Acknowledges a subscription with the order's current state.
    OrderSubscribed {
        /// Subscribed order.
        order_id: i64,
        /// Current order state.
        order: Order,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Acknowledges an unsubscription.
    OrderUnsubscribed {
        /// Order no longer followed.
        order_id: i64,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Full order state after a change; sent to the order's subscribers.
    OrderUpdate {
        /// Updated order.
        order: Order,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Lightweight change notice; sent to every order-channel connection.
    OrderStatusChanged {
        /// Changed order.
        order_id: i64,
        /// Status before the change.
        previous_status: OrderStatus,
        /// New status.
        status: OrderStatus,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// The client sent something the server could not act on.
    Error {
        /// What went wrong.
        message: String,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
}

impl OrderMessage {
    /// Builds an `error` frame stamped with the current time.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Client → server frames on the order channel.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OrderCommand {
    /// Follow one order.
    Subscribe {
        /// Order to follow.
        order_id: i64,
    },
    /// Stop following one order.
    Unsubscribe {
        /// Order to drop.
        order_id: i64,
    },
    /// Request an `all_orders_status` snapshot.
    GetAllOrders,
}
