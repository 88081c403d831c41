//! Order query/command collaborator.
//!
//! [`OrderStore`] is the seam to the persistence layer. The gateway ships
//! with [`InMemoryOrderStore`]; a database-backed store plugs in behind the
//! same trait.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::model::{NewOrder, Order, OrderStatus};
use crate::error::GatewayError;

/// Storage operations the order fan-out relies on.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync + std::fmt::Debug {
    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backing store fails.
    async fn get_order_by_id(&self, id: i64) -> Result<Option<Order>, GatewayError>;

    /// Fetches every order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backing store fails.
    async fn get_orders(&self) -> Result<Vec<Order>, GatewayError>;

    /// Persists a new order in `pending` state and returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backing store fails.
    async fn insert(&self, order: NewOrder) -> Result<Order, GatewayError>;

    /// Moves an order to `status` in one step and returns the stored order
    /// together with the status it had before. Setting the current status
    /// again changes nothing and returns it as both.
    ///
    /// The check and the write must be atomic with respect to other
    /// transitions of the same order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist
    /// and [`GatewayError::InvalidRequest`] if the order is already
    /// delivered or cancelled.
    async fn transition(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), GatewayError>;
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    orders: BTreeMap<i64, Order>,
}

/// Process-local [`OrderStore`].
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    table: RwLock<Table>,
}

impl InMemoryOrderStore {
    /// Creates an empty store; ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order_by_id(&self, id: i64) -> Result<Option<Order>, GatewayError> {
        Ok(self.table.read().await.orders.get(&id).cloned())
    }

    async fn get_orders(&self) -> Result<Vec<Order>, GatewayError> {
        Ok(self.table.read().await.orders.values().cloned().collect())
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, GatewayError> {
        let mut table = self.table.write().await;
        table.next_id = table.next_id.saturating_add(1);
        let now = Utc::now();
        let order = Order {
            id: table.next_id,
            customer_name: order.customer_name.trim().to_string(),
            delivery_address: order.delivery_address.trim().to_string(),
            product_name: order.product_name.trim().to_string(),
            quantity: order.quantity,
            drone_id: order.drone_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        table.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn transition(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), GatewayError> {
        let mut table = self.table.write().await;
        let order = table
            .orders
            .get_mut(&id)
            .ok_or(GatewayError::OrderNotFound(id))?;
        let previous = order.status;
        if previous == status {
            return Ok((order.clone(), previous));
        }
        if previous.is_terminal() {
            return Err(GatewayError::InvalidRequest(format!(
                "order {id} is already {previous}"
            )));
        }
        order.status = status;
        order.updated_at = Utc::now();
        Ok((order.clone(), previous))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_order(product: &str) -> NewOrder {
        NewOrder {
            customer_name: "Ada".to_string(),
            delivery_address: "1 Runway Rd".to_string(),
            product_name: product.to_string(),
            quantity: 1,
            drone_id: None,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_orders_listed_in_order() {
        let store = InMemoryOrderStore::new();
        let Ok(first) = store.insert(new_order("tea")).await else {
            panic!("insert failed");
        };
        let Ok(second) = store.insert(new_order("cake")).await else {
            panic!("insert failed");
        };
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.status, OrderStatus::Pending);

        let Ok(all) = store.get_orders().await else {
            panic!("list failed");
        };
        let ids: Vec<i64> = all.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn transition_of_missing_order_fails() {
        let store = InMemoryOrderStore::new();
        let result = store.transition(42, OrderStatus::Confirmed).await;
        assert!(matches!(result, Err(GatewayError::OrderNotFound(42))));
        assert!(matches!(store.get_order_by_id(42).await, Ok(None)));
    }

    #[tokio::test]
    async fn transition_reports_previous_status() {
        let store = InMemoryOrderStore::new();
        let Ok(order) = store.insert(new_order("tea")).await else {
            panic!("insert failed");
        };
        let Ok((updated, previous)) = store.transition(order.id, OrderStatus::InFlight).await
        else {
            panic!("transition failed");
        };
        assert_eq!(previous, OrderStatus::Pending);
        assert_eq!(updated.status, OrderStatus::InFlight);

        let Ok((same, previous)) = store.transition(order.id, OrderStatus::InFlight).await else {
            panic!("repeat transition failed");
        };
        assert_eq!(previous, OrderStatus::InFlight);
        assert_eq!(same.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn concurrent_transitions_never_leave_a_terminal_state() {
        let store = Arc::new(InMemoryOrderStore::new());
        for _ in 0..50 {
            let Ok(order) = store.insert(new_order("tea")).await else {
                panic!("insert failed");
            };
            let cancel = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.transition(order.id, OrderStatus::Cancelled).await })
            };
            let fly = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.transition(order.id, OrderStatus::InFlight).await })
            };
            let (Ok(cancel), Ok(fly)) = (cancel.await, fly.await) else {
                panic!("task panicked");
            };
            let Ok(Some(stored)) = store.get_order_by_id(order.id).await else {
                panic!("order vanished");
            };

            assert!(cancel.is_ok(), "cancel always wins or follows in_flight");
            assert_eq!(stored.status, OrderStatus::Cancelled);
            match fly {
                Ok((_, previous)) => assert_eq!(previous, OrderStatus::Pending),
                Err(e) => assert!(matches!(e, GatewayError::InvalidRequest(_))),
            }
        }
    }
}
