//! Delivery orders and their status fan-out.

pub mod model;
pub mod service;
pub mod store;

pub use model::{NewOrder, Order, OrderStatus};
pub use service::OrderService;
pub use store::{InMemoryOrderStore, OrderStore};
