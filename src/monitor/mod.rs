//! Controller reachability monitoring.

pub mod poller;
pub mod probe;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

pub use poller::{PollerHandle, PollerSettings, ReachabilityPoller, ReachabilityState};
pub use probe::{Probe, TcpProbe};

/// Result of one reachability probe. Broadcast as-is, never diffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Whether the controller answered.
    pub reachable: bool,
    /// Probed address.
    pub target: String,
    /// Probe duration when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip_ms: Option<u64>,
    /// Failure reason when unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Probe completion time.
    pub checked_at: DateTime<Utc>,
}
