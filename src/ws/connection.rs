//! Read/write loop for a single WebSocket connection.
//!
//! The socket is split in two: a writer task drains the connection's
//! outbound queue into the sink, while the read loop hands every text frame
//! to the channel's [`Channel`] implementation. All outbound traffic, replies
//! included, goes through the [`ConnectionRegistry`] so a connection only
//! ever has one writer.

use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::{ConnectionId, ConnectionRegistry};

/// Per-channel behavior plugged into [`run_connection`].
#[async_trait::async_trait]
pub trait Channel: Send + Sync + 'static {
    /// Channel name used in logs.
    fn name(&self) -> &'static str;

    /// Registry the channel's connections live in.
    fn registry(&self) -> &ConnectionRegistry;

    /// Called once, right after the connection is registered.
    async fn on_open(&self, id: ConnectionId);

    /// Called for every text frame received from the client.
    async fn on_text(&self, id: ConnectionId, text: &str);
}

/// Runs a connection until the client closes it, the socket errors, or the
/// connection is dropped from the registry after a failed delivery.
///
/// On exit the connection is removed from the registry (and thereby from
/// every topic) before the socket is released.
pub async fn run_connection<C: Channel + ?Sized>(socket: WebSocket, channel: Arc<C>, buffer: usize) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbox, mut queue) = mpsc::channel::<Utf8Bytes>(buffer.max(1));

    let registry = channel.registry();
    let id = registry.add(outbox).await;
    tracing::info!(channel = channel.name(), connection = %id, "ws client connected");

    let mut writer = tokio::spawn(async move {
        while let Some(text) = queue.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    channel.on_open(id).await;

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => channel.on_text(id, text.as_str()).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection = %id, error = %e, "ws receive failed");
                        break;
                    }
                    // Ping/pong is answered by axum; binary frames are not part of the protocol.
                    Some(Ok(_)) => {}
                }
            }
            // Writer ended: send failure or the registry dropped the queue.
            _ = &mut writer => break,
        }
    }

    registry.remove(id).await;
    writer.abort();
    tracing::info!(channel = channel.name(), connection = %id, "ws client disconnected");
}
