//! Axum WebSocket upgrade handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws/status`: Upgrade to the device/drone status channel.
pub async fn status_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let channel = Arc::clone(&state.status_channel);
    let buffer = state.ws_client_buffer;
    ws.on_upgrade(move |socket| run_connection(socket, channel, buffer))
}

/// `GET /ws/orders`: Upgrade to the order channel.
pub async fn orders_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let channel = Arc::clone(&state.order_channel);
    let buffer = state.ws_client_buffer;
    ws.on_upgrade(move |socket| run_connection(socket, channel, buffer))
}
