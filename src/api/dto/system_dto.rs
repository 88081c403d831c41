//! Health and telemetry ingestion responses.

use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Open WebSocket connections per channel.
    pub connections: ConnectionCounts,
}

/// Open WebSocket connections per channel.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCounts {
    /// `/ws/status` connections.
    pub status: usize,
    /// `/ws/orders` connections.
    pub orders: usize,
}

/// Response body for `POST /api/v1/telemetry`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryAccepted {
    /// Always `true`.
    pub success: bool,
    /// Drone the report belongs to.
    pub drone_id: String,
    /// Number of status-channel subscribers the report was delivered to.
    pub delivered: usize,
}
