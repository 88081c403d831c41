//! Registry of open WebSocket connections and their topic subscriptions.
//!
//! [`ConnectionRegistry`] owns the outbound queue of every connection on one
//! channel. Both maps live behind a single [`tokio::sync::RwLock`], so
//! deregistering a connection removes it from the connection table and from
//! every topic in one step.
//!
//! # Delivery
//!
//! A message is serialized once and pushed into each target's bounded
//! outbound queue without waiting. A queue that is closed (the writer task
//! ended) or full (the client stopped reading) counts as a delivery failure
//! for that connection only; the connection is then deregistered.

use std::collections::{HashMap, HashSet};
use std::fmt;

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};

use super::ConnectionId;

/// Subscription key, e.g. a drone id (`"drone-1"`) or an order
/// (`"order-5"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Topic carrying updates for one order.
    #[must_use]
    pub fn order(order_id: i64) -> Self {
        Self(format!("order-{order_id}"))
    }

    /// Returns the topic key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound queue of one connection.
pub type Outbox = mpsc::Sender<Utf8Bytes>;

#[derive(Debug)]
struct Entry {
    outbox: Outbox,
    topics: HashSet<Topic>,
}

impl Entry {
    fn try_deliver(&self, text: &Utf8Bytes) -> bool {
        !self.outbox.is_closed() && self.outbox.try_send(text.clone()).is_ok()
    }
}

#[derive(Debug, Default)]
struct Inner {
    connections: HashMap<ConnectionId, Entry>,
    topics: HashMap<Topic, HashSet<ConnectionId>>,
}

impl Inner {
    fn detach(&mut self, id: ConnectionId, topic: &Topic) {
        if let Some(subscribers) = self.topics.get_mut(topic) {
            subscribers.remove(&id);
            if subscribers.is_empty() {
                self.topics.remove(topic);
            }
        }
    }
}

/// Shared registry of open connections for one WebSocket channel.
///
/// Constructed once per channel at startup and injected through
/// [`crate::app_state::AppState`]; all access goes through this API.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns its generated id.
    pub async fn add(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new();
        let entry = Entry {
            outbox,
            topics: HashSet::new(),
        };
        self.inner.write().await.connections.insert(id, entry);
        id
    }

    /// Unregisters a connection and purges it from every topic.
    ///
    /// Returns `false` if the connection was not registered; calling this
    /// more than once is harmless.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.connections.remove(&id) else {
            return false;
        };
        for topic in &entry.topics {
            inner.detach(id, topic);
        }
        true
    }

    /// Adds a connection to a topic. Subscribing twice has no further effect.
    ///
    /// Returns `false` if the connection is not registered.
    pub async fn subscribe(&self, id: ConnectionId, topic: Topic) -> bool {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.connections.get_mut(&id) else {
            return false;
        };
        entry.topics.insert(topic.clone());
        inner.topics.entry(topic).or_default().insert(id);
        true
    }

    /// Removes a connection from a topic, dropping the topic once it has no
    /// subscribers left.
    ///
    /// Returns `false` if the connection was not subscribed to the topic.
    pub async fn unsubscribe(&self, id: ConnectionId, topic: &Topic) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner
            .connections
            .get_mut(&id)
            .is_some_and(|entry| entry.topics.remove(topic));
        if removed {
            inner.detach(id, topic);
        }
        removed
    }

    /// Sends a message to a single connection.
    ///
    /// Returns `false` (and deregisters the connection) on delivery failure,
    /// or `false` if the connection is unknown.
    pub async fn send_to<T: Serialize>(&self, id: ConnectionId, message: &T) -> bool {
        let Some(text) = encode(message) else {
            return false;
        };
        let delivered = {
            let inner = self.inner.read().await;
            match inner.connections.get(&id) {
                Some(entry) => entry.try_deliver(&text),
                None => return false,
            }
        };
        if !delivered {
            tracing::warn!(connection = %id, "ws delivery failed; dropping connection");
            self.remove(id).await;
        }
        delivered
    }

    /// Delivers a message to every registered connection.
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn broadcast_all<T: Serialize>(&self, message: &T) -> usize {
        let Some(text) = encode(message) else {
            return 0;
        };
        let (delivered, failed) = {
            let inner = self.inner.read().await;
            deliver(&inner, inner.connections.keys().copied(), &text)
        };
        self.purge(failed).await;
        delivered
    }

    /// Delivers a message to the subscribers of `topic` only.
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn broadcast_topic<T: Serialize>(&self, topic: &Topic, message: &T) -> usize {
        let Some(text) = encode(message) else {
            return 0;
        };
        let (delivered, failed) = {
            let inner = self.inner.read().await;
            match inner.topics.get(topic) {
                Some(subscribers) => deliver(&inner, subscribers.iter().copied(), &text),
                None => (0, Vec::new()),
            }
        };
        self.purge(failed).await;
        delivered
    }

    /// Returns `true` if the connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.inner.read().await.connections.contains_key(&id)
    }

    /// Returns the subscribers of a topic.
    pub async fn subscribers(&self, topic: &Topic) -> HashSet<ConnectionId> {
        self.inner
            .read()
            .await
            .topics
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the topics a connection is subscribed to.
    pub async fn topics_of(&self, id: ConnectionId) -> HashSet<Topic> {
        self.inner
            .read()
            .await
            .connections
            .get(&id)
            .map(|entry| entry.topics.clone())
            .unwrap_or_default()
    }

    /// Returns the number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Returns the number of topics with at least one subscriber.
    pub async fn topic_count(&self) -> usize {
        self.inner.read().await.topics.len()
    }

    async fn purge(&self, failed: Vec<ConnectionId>) {
        for id in failed {
            tracing::warn!(connection = %id, "ws delivery failed; dropping connection");
            self.remove(id).await;
        }
    }
}

fn encode<T: Serialize>(message: &T) -> Option<Utf8Bytes> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Utf8Bytes::from(json)),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize ws message");
            None
        }
    }
}

fn deliver(
    inner: &Inner,
    targets: impl Iterator<Item = ConnectionId>,
    text: &Utf8Bytes,
) -> (usize, Vec<ConnectionId>) {
    let mut delivered = 0;
    let mut failed = Vec::new();
    for id in targets {
        match inner.connections.get(&id) {
            Some(entry) if entry.try_deliver(text) => delivered += 1,
            Some(_) => failed.push(id),
            None => {}
        }
    }
    (delivered, failed)
}
