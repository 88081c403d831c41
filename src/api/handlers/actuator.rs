//! Drone box actuator handlers.
//!
//! Each endpoint takes a bare JSON boolean naming the desired state, sends
//! the mapped command through the relay, and echoes the state back.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ActuatorResponse, BoxStatusResponse};
use crate::api::extract::DesiredState;
use crate::actuator::{Actuator, Slot};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

async fn drive(
    state: &AppState,
    actuator: Actuator,
    desired: bool,
) -> Result<Json<ActuatorResponse>, GatewayError> {
    let outcome = state.actuators.execute(actuator, desired).await?;
    Ok(Json(ActuatorResponse::from(outcome)))
}

fn slot(path: Result<Path<u8>, PathRejection>) -> Result<Slot, GatewayError> {
    let Path(n) = path.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    Slot::try_from(n)
}

/// `POST /box/roof`: Open (`true`) or close (`false`) the roof.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body or a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/roof",
    tag = "Box",
    summary = "Open or close the roof",
    request_body(content = bool, description = "`true` opens, `false` closes"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not a JSON boolean", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn roof(
    State(state): State<AppState>,
    DesiredState(open): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    drive(&state, Actuator::Roof, open).await
}

/// `POST /box/position`: Move the drone to the center (`true`) or the
/// edge (`false`).
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body or a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/position",
    tag = "Box",
    summary = "Center the drone or move it to the edge",
    request_body(content = bool, description = "`true` centers, `false` moves to the edge"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not a JSON boolean", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn position(
    State(state): State<AppState>,
    DesiredState(center): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    drive(&state, Actuator::Position, center).await
}

/// `POST /box/table`: Raise (`true`) or lower (`false`) the table.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body or a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/table",
    tag = "Box",
    summary = "Raise or lower the table",
    request_body(content = bool, description = "`true` raises, `false` lowers"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not a JSON boolean", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn table(
    State(state): State<AppState>,
    DesiredState(up): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    drive(&state, Actuator::Table, up).await
}

/// `POST /box/hatch`: Open (`true`) or close (`false`) the hatch.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body or a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/hatch",
    tag = "Box",
    summary = "Open or close the hatch",
    request_body(content = bool, description = "`true` opens, `false` closes"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not a JSON boolean", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn hatch(
    State(state): State<AppState>,
    DesiredState(open): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    drive(&state, Actuator::Hatch, open).await
}

/// `POST /box/drone-battery`: Install (`true`) or remove (`false`) the
/// drone's battery.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body or a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/drone-battery",
    tag = "Box",
    summary = "Install or remove the drone battery",
    request_body(content = bool, description = "`true` installs, `false` removes"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not a JSON boolean", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn drone_battery(
    State(state): State<AppState>,
    DesiredState(install): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    drive(&state, Actuator::DroneBattery, install).await
}

/// `POST /box/battery/{n}`: Install (`true`) or remove (`false`) the
/// battery of storage slot `n`.
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad slot, a malformed body or a failed
/// exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/battery/{n}",
    tag = "Box",
    summary = "Install or remove a slot battery",
    params(("n" = u8, Path, description = "Battery slot, 1-3")),
    request_body(content = bool, description = "`true` installs, `false` removes"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Bad slot or body", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn battery(
    path: Result<Path<u8>, PathRejection>,
    State(state): State<AppState>,
    DesiredState(install): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    let slot = slot(path)?;
    drive(&state, Actuator::Battery(slot), install).await
}

/// `POST /box/battery/{n}/charger`: Switch the charger of slot `n` on
/// (`true`) or off (`false`).
///
/// # Errors
///
/// Returns [`GatewayError`] on a bad slot, a malformed body or a failed
/// exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/battery/{n}/charger",
    tag = "Box",
    summary = "Switch a slot charger on or off",
    params(("n" = u8, Path, description = "Battery slot, 1-3")),
    request_body(content = bool, description = "`true` switches on, `false` off"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Bad slot or body", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn charger(
    path: Result<Path<u8>, PathRejection>,
    State(state): State<AppState>,
    DesiredState(on): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    let slot = slot(path)?;
    drive(&state, Actuator::Charger(slot), on).await
}

/// `POST /box/stop`: Emergency stop. Only `true` is accepted.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for `false` and
/// [`GatewayError::CommandFailed`] on a failed exchange.
#[utoipa::path(
    post,
    path = "/api/v1/box/stop",
    tag = "Box",
    summary = "Stop all actuators",
    request_body(content = bool, description = "Must be `true`"),
    responses(
        (status = 200, description = "Command acknowledged", body = ActuatorResponse),
        (status = 400, description = "Body is not `true`", body = ErrorResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn stop(
    State(state): State<AppState>,
    DesiredState(confirm): DesiredState,
) -> Result<impl IntoResponse, GatewayError> {
    if !confirm {
        return Err(GatewayError::InvalidRequest(
            "stop only accepts true".to_string(),
        ));
    }
    drive(&state, Actuator::Stop, true).await
}

/// `GET /box/status`: Query the controller's live status.
///
/// # Errors
///
/// Returns [`GatewayError::CommandFailed`] if the status exchange fails.
#[utoipa::path(
    get,
    path = "/api/v1/box/status",
    tag = "Box",
    summary = "Live box status",
    description = "Sends the STATUS command and returns the raw controller reply together with the most recent reachability probe.",
    responses(
        (status = 200, description = "Controller status", body = BoxStatusResponse),
        (status = 502, description = "Controller rejected the command", body = ErrorResponse),
        (status = 504, description = "Controller timed out", body = ErrorResponse),
    )
)]
pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let outcome = state.actuators.execute(Actuator::Status, true).await?;
    let reachability = state.reachability.read().await.clone();
    Ok(Json(BoxStatusResponse {
        success: true,
        message: outcome.message,
        command: outcome.command,
        linuxcnc_response: outcome.response,
        reachability,
    }))
}

/// Actuator routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/box/roof", post(roof))
        .route("/box/position", post(position))
        .route("/box/table", post(table))
        .route("/box/hatch", post(hatch))
        .route("/box/drone-battery", post(drone_battery))
        .route("/box/battery/{n}", post(battery))
        .route("/box/battery/{n}/charger", post(charger))
        .route("/box/stop", post(stop))
        .route("/box/status", get(status))
}
