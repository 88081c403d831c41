//! Order handlers: create, list, get, status change.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::UpdateOrderStatusRequest;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::orders::{NewOrder, Order};

/// `POST /orders`: Create an order.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on invalid fields.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "Create an order",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Invalid order", body = ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<NewOrder>,
) -> Result<impl IntoResponse, GatewayError> {
    let order = state.orders.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders`: List every order.
///
/// # Errors
///
/// Returns [`GatewayError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "List orders",
    responses(
        (status = 200, description = "All orders, oldest first", body = Vec<Order>),
    )
)]
pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.orders.list_orders().await?))
}

/// `GET /orders/{id}`: Get one order.
///
/// # Errors
///
/// Returns [`GatewayError::OrderNotFound`] if the order does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    summary = "Get an order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.orders.get_order(id).await?))
}

/// `PUT /orders/{id}/status`: Change an order's status and notify the
/// order channel.
///
/// # Errors
///
/// Returns [`GatewayError::OrderNotFound`] if the order does not exist and
/// [`GatewayError::InvalidRequest`] if it is already delivered or
/// cancelled.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    tag = "Orders",
    summary = "Change order status",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Order can no longer change", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(state.orders.update_status(id, req.status).await?))
}

/// Order routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
}
