//! Device/drone status channel (`/ws/status`).
//!
//! Every connection receives the poller's reachability snapshots. Clients
//! may additionally follow individual drones; telemetry for a followed drone
//! is delivered on the drone's topic.

use std::sync::Arc;

use chrono::Utc;

use super::connection::Channel;
use super::messages::{StatusCommand, StatusData, StatusMessage};
use super::{ConnectionId, ConnectionRegistry, Topic};
use crate::telemetry::TelemetryService;

/// [`Channel`] implementation for the status endpoint.
#[derive(Debug)]
pub struct StatusChannel {
    hub: Arc<ConnectionRegistry>,
    telemetry: Arc<TelemetryService>,
}

impl StatusChannel {
    /// Creates the channel over the status registry.
    #[must_use]
    pub fn new(hub: Arc<ConnectionRegistry>, telemetry: Arc<TelemetryService>) -> Self {
        Self { hub, telemetry }
    }

    async fn subscribe(&self, id: ConnectionId, drone_id: &str) {
        self.hub.subscribe(id, Topic::new(drone_id)).await;
        self.hub
            .send_to(
                id,
                &StatusMessage::Subscribed {
                    drone_id: drone_id.to_string(),
                    timestamp: Utc::now(),
                },
            )
            .await;

        if let Some(report) = self.telemetry.latest(drone_id).await {
            self.hub
                .send_to(
                    id,
                    &StatusMessage::update(Some(drone_id.to_string()), StatusData::Telemetry(report)),
                )
                .await;
        }
        tracing::debug!(connection = %id, drone_id, "subscribed to drone");
    }

    async fn unsubscribe(&self, id: ConnectionId, drone_id: &str) {
        self.hub.unsubscribe(id, &Topic::new(drone_id)).await;
        self.hub
            .send_to(
                id,
                &StatusMessage::Unsubscribed {
                    drone_id: drone_id.to_string(),
                    timestamp: Utc::now(),
                },
            )
            .await;
        tracing::debug!(connection = %id, drone_id, "unsubscribed from drone");
    }
}

#[async_trait::async_trait]
impl Channel for StatusChannel {
    fn name(&self) -> &'static str {
        "status"
    }

    fn registry(&self) -> &ConnectionRegistry {
        &self.hub
    }

    async fn on_open(&self, id: ConnectionId) {
        self.hub
            .send_to(
                id,
                &StatusMessage::Welcome {
                    connection_id: id,
                    message: "connected to drone box status channel".to_string(),
                    timestamp: Utc::now(),
                },
            )
            .await;
    }

    async fn on_text(&self, id: ConnectionId, text: &str) {
        let command = match serde_json::from_str::<StatusCommand>(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(connection = %id, error = %e, "invalid status command");
                self.hub
                    .send_to(id, &StatusMessage::error(format!("invalid message: {e}")))
                    .await;
                return;
            }
        };

        match command {
            StatusCommand::Subscribe { drone_id } | StatusCommand::Unsubscribe { drone_id }
                if drone_id.trim().is_empty() =>
            {
                self.hub
                    .send_to(id, &StatusMessage::error("droneId must not be empty"))
                    .await;
            }
            StatusCommand::Subscribe { drone_id } => self.subscribe(id, drone_id.trim()).await,
            StatusCommand::Unsubscribe { drone_id } => self.unsubscribe(id, drone_id.trim()).await,
        }
    }
}
