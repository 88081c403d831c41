//! Order channel (`/ws/orders`).

use std::sync::Arc;

use chrono::Utc;

use super::connection::Channel;
use super::messages::{OrderCommand, OrderMessage};
use super::{ConnectionId, ConnectionRegistry, Topic};
use crate::error::GatewayError;
use crate::orders::OrderService;

/// [`Channel`] implementation for the order endpoint.
#[derive(Debug)]
pub struct OrderChannel {
    orders: Arc<OrderService>,
}

impl OrderChannel {
    /// Creates the channel over the order service's registry.
    #[must_use]
    pub fn new(orders: Arc<OrderService>) -> Self {
        Self { orders }
    }

    fn hub(&self) -> &ConnectionRegistry {
        self.orders.hub()
    }

    async fn send_all_orders(&self, id: ConnectionId) {
        let message = match self.orders.list_orders().await {
            Ok(orders) => OrderMessage::AllOrdersStatus {
                orders,
                timestamp: Utc::now(),
            },
            Err(e) => {
                tracing::warn!(connection = %id, error = %e, "failed to load orders");
                OrderMessage::error("failed to load orders")
            }
        };
        self.hub().send_to(id, &message).await;
    }

    /// Subscribes before reading so no transition between the read and the
    /// subscription is lost.
    async fn subscribe(&self, id: ConnectionId, order_id: i64) {
        let topic = Topic::order(order_id);
        self.hub().subscribe(id, topic.clone()).await;

        let message = match self.orders.get_order(order_id).await {
            Ok(order) => OrderMessage::OrderSubscribed {
                order_id,
                order,
                timestamp: Utc::now(),
            },
            Err(e) => {
                self.hub().unsubscribe(id, &topic).await;
                if !matches!(e, GatewayError::OrderNotFound(_)) {
                    tracing::warn!(connection = %id, order_id, error = %e, "order lookup failed");
                }
                OrderMessage::error(e.to_string())
            }
        };
        self.hub().send_to(id, &message).await;
    }

    async fn unsubscribe(&self, id: ConnectionId, order_id: i64) {
        self.hub().unsubscribe(id, &Topic::order(order_id)).await;
        self.hub()
            .send_to(
                id,
                &OrderMessage::OrderUnsubscribed {
                    order_id,
                    timestamp: Utc::now(),
                },
            )
            .await;
    }
}

#[async_trait::async_trait]
impl Channel for OrderChannel {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn registry(&self) -> &ConnectionRegistry {
        self.hub()
    }

    async fn on_open(&self, id: ConnectionId) {
        self.send_all_orders(id).await;
    }

    async fn on_text(&self, id: ConnectionId, text: &str) {
        match serde_json::from_str::<OrderCommand>(text) {
            Ok(OrderCommand::Subscribe { order_id }) => self.subscribe(id, order_id).await,
            Ok(OrderCommand::Unsubscribe { order_id }) => self.unsubscribe(id, order_id).await,
            Ok(OrderCommand::GetAllOrders) => self.send_all_orders(id).await,
            Err(e) => {
                tracing::debug!(connection = %id, error = %e, "invalid order command");
                self.hub()
                    .send_to(id, &OrderMessage::error(format!("invalid message: {e}")))
                    .await;
            }
        }
    }
}
