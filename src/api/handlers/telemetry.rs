//! Telemetry ingestion and lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::TelemetryAccepted;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::telemetry::TelemetryReport;

/// `POST /telemetry`: Ingest one drone report and push it to the drone's
/// status-channel subscribers.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if a field is out of range.
#[utoipa::path(
    post,
    path = "/api/v1/telemetry",
    tag = "Telemetry",
    summary = "Ingest telemetry",
    request_body = TelemetryReport,
    responses(
        (status = 202, description = "Report accepted", body = TelemetryAccepted),
        (status = 400, description = "Invalid report", body = ErrorResponse),
    )
)]
pub async fn ingest(
    State(state): State<AppState>,
    Json(report): Json<TelemetryReport>,
) -> Result<impl IntoResponse, GatewayError> {
    let drone_id = report.drone_id.trim().to_string();
    let delivered = state.telemetry.ingest(report).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TelemetryAccepted {
            success: true,
            drone_id,
            delivered,
        }),
    ))
}

/// `GET /telemetry`: Ids of every drone that has reported.
#[utoipa::path(
    get,
    path = "/api/v1/telemetry",
    tag = "Telemetry",
    summary = "List reporting drones",
    responses(
        (status = 200, description = "Drone ids, sorted", body = Vec<String>),
    )
)]
pub async fn list_drones(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.telemetry.drones().await)
}

/// `GET /telemetry/{drone_id}`: Latest report of a drone.
///
/// # Errors
///
/// Returns [`GatewayError::TelemetryNotFound`] if the drone never reported.
#[utoipa::path(
    get,
    path = "/api/v1/telemetry/{drone_id}",
    tag = "Telemetry",
    summary = "Latest telemetry of a drone",
    params(("drone_id" = String, Path, description = "Drone id")),
    responses(
        (status = 200, description = "Latest report", body = TelemetryReport),
        (status = 404, description = "No telemetry for this drone", body = ErrorResponse),
    )
)]
pub async fn latest(
    State(state): State<AppState>,
    Path(drone_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .telemetry
        .latest(&drone_id)
        .await
        .map(Json)
        .ok_or(GatewayError::TelemetryNotFound(drone_id))
}

/// Telemetry routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/telemetry", get(list_drones).post(ingest))
        .route("/telemetry/{drone_id}", get(latest))
}
