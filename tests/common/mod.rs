//! Shared fixtures: a simulated box controller and application wiring.

#![allow(clippy::panic, dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dronebox_gateway::activity::TracingActivityLog;
use dronebox_gateway::api::build_app;
use dronebox_gateway::app_state::AppState;
use dronebox_gateway::config::GatewayConfig;
use dronebox_gateway::orders::InMemoryOrderStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// How the simulated controller answers a command line.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// `OK:<command>`.
    Ack,
    /// `ERROR:<command> refused`.
    Refuse,
    /// Accept, read, never answer.
    Silent,
}

/// Simulated controller listening on an ephemeral port.
#[derive(Debug)]
pub struct Device {
    pub port: u16,
    pub received: Arc<Mutex<Vec<String>>>,
}

impl Device {
    pub async fn start(reply: Reply) -> Self {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let mut buf = [0u8; 256];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let line = String::from_utf8_lossy(buf.get(..n).unwrap_or_default())
                        .trim()
                        .to_string();
                    if let Ok(mut seen) = log.lock() {
                        seen.push(line.clone());
                    }
                    let text = match reply {
                        Reply::Ack => format!("OK:{line}\n"),
                        Reply::Refuse => format!("ERROR:{line} refused\n"),
                        Reply::Silent => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            return;
                        }
                    };
                    let _ = socket.write_all(text.as_bytes()).await;
                });
            }
        });

        Self {
            port: addr.port(),
            received,
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.received.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

/// Configuration pointing at `device_port`, with a short read timeout.
pub fn config(device_port: u16) -> GatewayConfig {
    let port = device_port.to_string();
    let lookup = move |key: &str| match key {
        "DEVICE_HOST" => Some("127.0.0.1".to_string()),
        "DEVICE_PORT" => Some(port.clone()),
        "RELAY_CONNECT_TIMEOUT_MS" => Some("500".to_string()),
        "RELAY_READ_TIMEOUT_MS" => Some("300".to_string()),
        "LISTEN_ADDR" => Some("127.0.0.1:0".to_string()),
        _ => None,
    };
    let Ok(config) = GatewayConfig::from_lookup(lookup) else {
        panic!("test config must parse");
    };
    config
}

pub fn state(config: &GatewayConfig) -> AppState {
    let Ok(state) = AppState::new(
        config,
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(TracingActivityLog),
    ) else {
        panic!("state must build");
    };
    state
}

/// Serves the full application on an ephemeral port.
pub async fn serve(state: AppState) -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
