//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    ActuatorResponse, BoxStatusResponse, ConnectionCounts, HealthResponse, TelemetryAccepted,
    UpdateOrderStatusRequest,
};
use super::handlers::{actuator, orders, system, telemetry};
use crate::error::{ErrorBody, ErrorResponse};
use crate::monitor::StatusSnapshot;
use crate::orders::{NewOrder, Order, OrderStatus};
use crate::telemetry::TelemetryReport;

/// Aggregated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "dronebox-gateway", description = "Drone box command relay and status fan-out"),
    paths(
        actuator::roof,
        actuator::position,
        actuator::table,
        actuator::hatch,
        actuator::drone_battery,
        actuator::battery,
        actuator::charger,
        actuator::stop,
        actuator::status,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        telemetry::ingest,
        telemetry::list_drones,
        telemetry::latest,
        system::health_handler,
    ),
    components(schemas(
        ActuatorResponse,
        BoxStatusResponse,
        StatusSnapshot,
        Order,
        NewOrder,
        OrderStatus,
        UpdateOrderStatusRequest,
        TelemetryReport,
        TelemetryAccepted,
        HealthResponse,
        ConnectionCounts,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Box", description = "Drone box actuators"),
        (name = "Orders", description = "Delivery orders"),
        (name = "Telemetry", description = "Drone telemetry"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_box_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/box/roof",
            "/api/v1/box/battery/{n}",
            "/api/v1/box/battery/{n}/charger",
            "/api/v1/box/status",
            "/api/v1/orders/{id}/status",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
