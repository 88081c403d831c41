//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::actuator::{ActuatorMapping, ActuatorService};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::monitor::{ReachabilityPoller, ReachabilityState, TcpProbe};
use crate::orders::{OrderService, OrderStore};
use crate::relay::RelayClient;
use crate::telemetry::TelemetryService;
use crate::ws::{ConnectionRegistry, OrderChannel, StatusChannel};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// Every registry is constructed here and owned by the server process;
/// nothing lives in a global.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Actuator facade over the relay client.
    pub actuators: Arc<ActuatorService>,
    /// Orders and their fan-out.
    pub orders: Arc<OrderService>,
    /// Drone telemetry store and fan-out.
    pub telemetry: Arc<TelemetryService>,
    /// Registry of `/ws/status` connections.
    pub status_hub: Arc<ConnectionRegistry>,
    /// `/ws/status` message routing.
    pub status_channel: Arc<StatusChannel>,
    /// `/ws/orders` message routing.
    pub order_channel: Arc<OrderChannel>,
    /// Most recent reachability snapshot.
    pub reachability: ReachabilityState,
    /// Outbound queue capacity per WebSocket client.
    pub ws_client_buffer: usize,
}

impl AppState {
    /// Wires every service from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator command table cannot be built.
    pub fn new(
        config: &GatewayConfig,
        store: Arc<dyn OrderStore>,
        activity: Arc<dyn ActivityLog>,
    ) -> Result<Self, GatewayError> {
        let relay = Arc::new(RelayClient::new(config.relay_settings()));
        let mapping = Arc::new(ActuatorMapping::standard()?);
        let actuators = Arc::new(ActuatorService::new(relay, mapping, Arc::clone(&activity)));

        let status_hub = Arc::new(ConnectionRegistry::new());
        let order_hub = Arc::new(ConnectionRegistry::new());

        let telemetry = Arc::new(TelemetryService::new(Arc::clone(&status_hub)));
        let orders = Arc::new(OrderService::new(store, order_hub, activity));

        let status_channel = Arc::new(StatusChannel::new(
            Arc::clone(&status_hub),
            Arc::clone(&telemetry),
        ));
        let order_channel = Arc::new(OrderChannel::new(Arc::clone(&orders)));

        Ok(Self {
            actuators,
            orders,
            telemetry,
            status_hub,
            status_channel,
            order_channel,
            reachability: ReachabilityState::default(),
            ws_client_buffer: config.ws_client_buffer,
        })
    }

    /// Builds the reachability poller for the configured controller. The
    /// poller writes into [`AppState::reachability`] and broadcasts on the
    /// status registry.
    #[must_use]
    pub fn reachability_poller(&self, config: &GatewayConfig) -> ReachabilityPoller {
        ReachabilityPoller::new(
            Arc::new(TcpProbe::new(config.device_host.clone(), config.device_port)),
            Arc::clone(&self.status_hub),
            Arc::clone(&self.reachability),
            config.poller_settings(),
        )
    }
}
