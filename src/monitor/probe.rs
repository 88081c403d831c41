//! Reachability probes.

use tokio::net::TcpStream;

/// Checks whether the box controller can be reached.
///
/// Implementations do not need to bound their own duration; the poller
/// applies the probe timeout.
#[async_trait::async_trait]
pub trait Probe: Send + Sync + std::fmt::Debug + 'static {
    /// Human-readable probe target, e.g. `"10.0.0.5:5007"`.
    fn target(&self) -> String;

    /// Succeeds if the target answered.
    ///
    /// # Errors
    ///
    /// Returns a description of why the target is unreachable.
    async fn probe(&self) -> Result<(), String>;
}

/// Probe that opens (and immediately closes) a TCP connection to the
/// controller port.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
}

impl TcpProbe {
    /// Creates a probe for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait::async_trait]
impl Probe for TcpProbe {
    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn probe(&self) -> Result<(), String> {
        TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map(drop)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn tcp_probe_reports_listener_state() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let probe = TcpProbe::new("127.0.0.1", addr.port());
        assert_eq!(probe.target(), format!("127.0.0.1:{}", addr.port()));
        assert!(probe.probe().await.is_ok());

        drop(listener);
        assert!(probe.probe().await.is_err());
    }
}
