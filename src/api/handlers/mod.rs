//! REST endpoint handlers organized by resource.

pub mod actuator;
pub mod orders;
pub mod system;
pub mod telemetry;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(actuator::routes())
        .merge(orders::routes())
        .merge(telemetry::routes())
}
