//! One-shot TCP client for the box controller.
//!
//! Every call opens a fresh connection, writes a single command line, reads
//! one reply and disconnects. There is no shared state between calls, so
//! concurrent requests never contend with each other.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::command::{Command, CommandResult, RelayFailure, decode_reply, interpret_reply};

/// Maximum number of reply bytes read from the controller.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Default bound on establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on waiting for the reply after the command is written.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Address and timeouts of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Controller host name or IP address.
    pub host: String,
    /// Controller TCP port.
    pub port: u16,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Bound on waiting for the reply.
    pub read_timeout: Duration,
}

impl RelaySettings {
    /// Settings for `host:port` with the default timeouts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Command/response client for the controller.
#[derive(Debug, Clone)]
pub struct RelayClient {
    settings: RelaySettings,
}

impl RelayClient {
    /// Creates a client for the given controller.
    #[must_use]
    pub fn new(settings: RelaySettings) -> Self {
        Self { settings }
    }

    /// Returns the controller settings.
    #[must_use]
    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Performs one command/response exchange.
    ///
    /// The connection is closed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayFailure`] on connect/read timeout, socket error, or
    /// when the reply lacks the `OK:` prefix. No retry is attempted.
    pub async fn send(&self, command: &Command) -> CommandResult {
        let result = self.exchange(command).await;
        match &result {
            Ok(reply) => {
                tracing::debug!(%command, reply = %reply, "relay exchange acknowledged");
            }
            Err(failure) => {
                tracing::warn!(%command, error = %failure, "relay exchange failed");
            }
        }
        result
    }

    async fn exchange(&self, command: &Command) -> CommandResult {
        let RelaySettings {
            host,
            port,
            connect_timeout,
            read_timeout,
        } = &self.settings;

        let mut stream = match timeout(*connect_timeout, TcpStream::connect((host.as_str(), *port)))
            .await
        {
            Ok(Ok(stream)) => stream,
            // Refused or unreachable: the peer answered, so not a timeout.
            Ok(Err(e)) => return Err(RelayFailure::Transport(e.to_string())),
            Err(_) => return Err(RelayFailure::ConnectTimeout(*connect_timeout)),
        };

        stream
            .write_all(&command.to_frame())
            .await
            .map_err(|e| RelayFailure::Transport(e.to_string()))?;

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let read = match timeout(*read_timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(RelayFailure::Transport(e.to_string())),
            Err(_) => return Err(RelayFailure::ReadTimeout(*read_timeout)),
        };

        // Best effort; the socket is dropped right after either way.
        let _ = stream.shutdown().await;

        let text = decode_reply(buf.get(..read).unwrap_or_default());
        interpret_reply(text)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    async fn device(reply: &'static [u8]) -> (RelaySettings, tokio::task::JoinHandle<Vec<u8>>) {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let task = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return Vec::new();
            };
            let mut received = vec![0u8; 64];
            let n = socket.read(&mut received).await.unwrap_or(0);
            received.truncate(n);
            let _ = socket.write_all(reply).await;
            received
        });
        (RelaySettings::new("127.0.0.1", addr.port()), task)
    }

    fn command(token: &str) -> Command {
        let Ok(cmd) = Command::new(token) else {
            panic!("valid command");
        };
        cmd
    }

    #[tokio::test]
    async fn acknowledged_reply_is_success() {
        let (settings, device) = device(b"OK:B1ON\r\n").await;
        let client = RelayClient::new(settings);

        let result = client.send(&command("B1ON")).await;
        let Ok(reply) = result else {
            panic!("expected acknowledgment, got {result:?}");
        };
        assert_eq!(reply.as_str(), "OK:B1ON");

        let Ok(sent) = device.await else {
            panic!("device task failed");
        };
        assert_eq!(sent, b"B1ON\n".to_vec());
    }

    #[tokio::test]
    async fn other_reply_is_rejection_with_raw_text() {
        let (settings, _device) = device(b"ERR:JAMMED").await;
        let client = RelayClient::new(settings);

        let result = client.send(&command("TABLE_UP")).await;
        assert_eq!(result, Err(RelayFailure::Rejected("ERR:JAMMED".to_string())));
    }

    #[tokio::test]
    async fn silent_device_times_out_on_read() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let _hold = tokio::spawn(async move {
            let accepted = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(accepted);
        });

        let mut settings = RelaySettings::new("127.0.0.1", addr.port());
        settings.read_timeout = Duration::from_millis(200);
        let client = RelayClient::new(settings);

        let started = Instant::now();
        let result = client.send(&command("STOP")).await;
        assert_eq!(
            result,
            Err(RelayFailure::ReadTimeout(Duration::from_millis(200)))
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        drop(listener);

        let client = RelayClient::new(RelaySettings::new("127.0.0.1", addr.port()));
        let started = Instant::now();
        let result = client.send(&command("ROOF_OPEN")).await;

        let Err(failure) = result else {
            panic!("expected failure");
        };
        assert!(matches!(failure, RelayFailure::Transport(_)));
        assert!(failure.wire_text().starts_with("ERROR:"));
        assert!(started.elapsed() <= DEFAULT_CONNECT_TIMEOUT + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn unanswered_connect_times_out() {
        // Non-routable: the SYN is dropped rather than refused.
        let mut settings = RelaySettings::new("10.255.255.1", 5007);
        settings.connect_timeout = Duration::from_millis(200);
        let client = RelayClient::new(settings);

        let started = Instant::now();
        let Err(failure) = client.send(&command("ROOF_OPEN")).await else {
            panic!("expected failure");
        };
        match failure {
            RelayFailure::ConnectTimeout(bound) => {
                assert_eq!(bound, Duration::from_millis(200));
                assert!(failure.wire_text().starts_with("ERROR:"));
            }
            // Hosts with no route at all fail the connect immediately.
            RelayFailure::Transport(reason) => {
                assert!(reason.to_ascii_lowercase().contains("unreachable"), "{reason}");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn closed_without_reply_is_empty_rejection() {
        let (settings, _device) = device(b"").await;
        let client = RelayClient::new(settings);

        let result = client.send(&command("HATCH_OPEN")).await;
        assert_eq!(result, Err(RelayFailure::Rejected(String::new())));
    }
}
