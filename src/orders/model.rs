//! Delivery order model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Lifecycle state of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, not yet confirmed.
    Pending,
    /// Accepted by an operator.
    Confirmed,
    /// Being packed and loaded into the box.
    Preparing,
    /// Drone airborne with the parcel.
    InFlight,
    /// Handed over to the customer.
    Delivered,
    /// Abandoned.
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::InFlight => "in_flight",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        })
    }
}

/// A delivery order as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order number.
    pub id: i64,
    /// Customer display name.
    pub customer_name: String,
    /// Drop-off address.
    pub delivery_address: String,
    /// Ordered product.
    pub product_name: String,
    /// Number of units.
    pub quantity: u32,
    /// Drone assigned to the delivery, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_id: Option<String>,
    /// Current status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last status change.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer display name.
    pub customer_name: String,
    /// Drop-off address.
    pub delivery_address: String,
    /// Ordered product.
    pub product_name: String,
    /// Number of units (at least 1).
    pub quantity: u32,
    /// Drone assigned to the delivery, if already known.
    #[serde(default)]
    pub drone_id: Option<String>,
}

impl NewOrder {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on blank text fields or a
    /// zero quantity.
    pub fn validate(&self) -> Result<(), GatewayError> {
        for (field, value) in [
            ("customerName", &self.customer_name),
            ("deliveryAddress", &self.delivery_address),
            ("productName", &self.product_name),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::InvalidRequest(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.quantity == 0 {
            return Err(GatewayError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
