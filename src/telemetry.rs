//! Drone telemetry ingestion and per-drone fan-out.
//!
//! Producers post [`TelemetryReport`]s; the latest report per drone is kept
//! in memory and pushed to the status-channel subscribers of that drone.
//! At most [`MAX_TRACKED_DRONES`] drones are tracked; a new drone beyond
//! that evicts the one whose latest report is oldest.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::error::GatewayError;
use crate::ws::messages::{StatusData, StatusMessage};
use crate::ws::{ConnectionRegistry, Topic};

/// Default bound on the number of drones whose latest report is kept.
pub const MAX_TRACKED_DRONES: usize = 1024;

/// One telemetry sample from a drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReport {
    /// Reporting drone, e.g. `"drone-1"`.
    pub drone_id: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude above take-off point, meters.
    pub altitude: f64,
    /// Ground speed, m/s.
    #[serde(default)]
    pub speed: f64,
    /// Battery charge, percent.
    pub battery_level: f64,
    /// Sample time; the server's receive time when omitted.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TelemetryReport {
    /// Checks field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let invalid = |msg: &str| Err(GatewayError::InvalidRequest(msg.to_string()));

        if self.drone_id.trim().is_empty() {
            return invalid("droneId must not be empty");
        }
        let numbers = [
            self.latitude,
            self.longitude,
            self.altitude,
            self.speed,
            self.battery_level,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return invalid("telemetry values must be finite numbers");
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return invalid("latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return invalid("longitude must be within [-180, 180]");
        }
        if self.speed < 0.0 {
            return invalid("speed must not be negative");
        }
        if !(0.0..=100.0).contains(&self.battery_level) {
            return invalid("batteryLevel must be within [0, 100]");
        }
        Ok(())
    }
}

/// Keeps the latest report per drone and fans reports out to subscribers.
#[derive(Debug)]
pub struct TelemetryService {
    latest: RwLock<HashMap<String, TelemetryReport>>,
    capacity: usize,
    hub: Arc<ConnectionRegistry>,
}

impl TelemetryService {
    /// Creates a service publishing on the given status-channel registry,
    /// tracking up to [`MAX_TRACKED_DRONES`] drones.
    #[must_use]
    pub fn new(hub: Arc<ConnectionRegistry>) -> Self {
        Self::with_capacity(hub, MAX_TRACKED_DRONES)
    }

    /// Like [`TelemetryService::new`] with a custom drone bound. A zero
    /// capacity is raised to one.
    #[must_use]
    pub fn with_capacity(hub: Arc<ConnectionRegistry>, capacity: usize) -> Self {
        Self {
            latest: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            hub,
        }
    }

    /// Returns the status-channel registry.
    #[must_use]
    pub fn hub(&self) -> &Arc<ConnectionRegistry> {
        &self.hub
    }

    /// Validates, stores and publishes a report.
    ///
    /// Returns the number of subscribers the update was queued for.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the report is invalid.
    pub async fn ingest(&self, mut report: TelemetryReport) -> Result<usize, GatewayError> {
        report.validate()?;
        let drone_id = report.drone_id.trim().to_string();
        report.drone_id.clone_from(&drone_id);

        {
            let mut latest = self.latest.write().await;
            if !latest.contains_key(&drone_id) && latest.len() >= self.capacity {
                let stalest = latest
                    .iter()
                    .min_by_key(|(_, r)| r.timestamp)
                    .map(|(id, _)| id.clone());
                if let Some(evicted) = stalest {
                    latest.remove(&evicted);
                    tracing::debug!(drone = %evicted, "telemetry evicted");
                }
            }
            latest.insert(drone_id.clone(), report.clone());
        }

        let topic = Topic::new(drone_id.clone());
        let message = StatusMessage::update(Some(drone_id.clone()), StatusData::Telemetry(report));
        let delivered = self.hub.broadcast_topic(&topic, &message).await;
        tracing::debug!(drone = %drone_id, delivered, "telemetry published");
        Ok(delivered)
    }

    /// Returns the most recent report of a drone.
    pub async fn latest(&self, drone_id: &str) -> Option<TelemetryReport> {
        self.latest.read().await.get(drone_id).cloned()
    }

    /// Returns the ids of every drone that has reported.
    pub async fn drones(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.latest.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
