//! Order service: order CRUD plus status fan-out on the order channel.

use std::sync::Arc;

use chrono::Utc;

use super::model::{NewOrder, Order, OrderStatus};
use super::store::OrderStore;
use crate::activity::{ActivityLog, Severity};
use crate::error::GatewayError;
use crate::ws::messages::OrderMessage;
use crate::ws::{ConnectionRegistry, Topic};

const ACTOR: &str = "orders";

/// Coordinates the order store and the order-channel registry.
///
/// Every status transition follows the pattern: atomic check-and-write in the
/// store → send
/// `order_update` to the order's topic → send `order_status_changed` to all
/// order-channel connections.
#[derive(Debug, Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    hub: Arc<ConnectionRegistry>,
    activity: Arc<dyn ActivityLog>,
}

impl OrderService {
    /// Creates a new `OrderService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        hub: Arc<ConnectionRegistry>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            store,
            hub,
            activity,
        }
    }

    /// Returns the order-channel registry.
    #[must_use]
    pub fn hub(&self) -> &Arc<ConnectionRegistry> {
        &self.hub
    }

    /// Validates and stores a new order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on invalid input, or the
    /// store's error.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
        order.validate()?;
        let order = self.store.insert(order).await?;
        self.activity.record(
            ACTOR,
            &format!("order {} created for {}", order.id, order.customer_name),
            Severity::Info,
        );
        tracing::info!(order_id = order.id, "order created");
        Ok(order)
    }

    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist.
    pub async fn get_order(&self, id: i64) -> Result<Order, GatewayError> {
        self.store
            .get_order_by_id(id)
            .await?
            .ok_or(GatewayError::OrderNotFound(id))
    }

    /// Lists every order.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn list_orders(&self) -> Result<Vec<Order>, GatewayError> {
        self.store.get_orders().await
    }

    /// Moves an order to a new status and notifies subscribers.
    ///
    /// Setting the current status again is a no-op and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist
    /// and [`GatewayError::InvalidRequest`] if the order is already
    /// delivered or cancelled.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Order, GatewayError> {
        let (order, previous_status) = self.store.transition(id, status).await?;
        if previous_status == status {
            return Ok(order);
        }

        let subscribers = self
            .hub
            .broadcast_topic(
                &Topic::order(id),
                &OrderMessage::OrderUpdate {
                    order: order.clone(),
                    timestamp: Utc::now(),
                },
            )
            .await;
        let notified = self
            .hub
            .broadcast_all(&OrderMessage::OrderStatusChanged {
                order_id: id,
                previous_status,
                status,
                timestamp: Utc::now(),
            })
            .await;

        self.activity.record(
            ACTOR,
            &format!("order {id}: {previous_status} -> {status}"),
            Severity::Info,
        );
        tracing::info!(
            order_id = id,
            from = %previous_status,
            to = %status,
            subscribers,
            notified,
            "order status changed"
        );
        Ok(order)
    }
}
