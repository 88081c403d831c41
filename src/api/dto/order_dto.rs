//! Order request bodies.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::orders::OrderStatus;

/// Request body for `PUT /api/v1/orders/{id}/status`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status.
    pub status: OrderStatus,
}
