//! Periodic controller reachability poller.
//!
//! After a startup grace delay the poller probes the controller on a fixed
//! interval and broadcasts a [`StatusSnapshot`] to every status-channel
//! connection on every tick, whether or not reachability changed. A failing
//! (or panicking, or hanging) probe only produces a negative snapshot; the
//! loop itself ends only when [`PollerHandle::stop`] is called.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep, timeout};

use super::StatusSnapshot;
use super::probe::Probe;
use crate::ws::ConnectionRegistry;
use crate::ws::messages::{StatusData, StatusMessage};

/// Most recent snapshot, shared with the HTTP status endpoint.
pub type ReachabilityState = Arc<RwLock<Option<StatusSnapshot>>>;

/// Poller timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    /// Time between probes.
    pub interval: Duration,
    /// Delay before the first probe.
    pub startup_delay: Duration,
    /// Bound on a single probe.
    pub probe_timeout: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            startup_delay: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(3),
        }
    }
}

/// Background task probing the controller and pushing snapshots.
#[derive(Debug)]
pub struct ReachabilityPoller {
    probe: Arc<dyn Probe>,
    hub: Arc<ConnectionRegistry>,
    latest: ReachabilityState,
    settings: PollerSettings,
}

impl ReachabilityPoller {
    /// Creates a poller broadcasting on `hub` and recording into `latest`.
    #[must_use]
    pub fn new(
        probe: Arc<dyn Probe>,
        hub: Arc<ConnectionRegistry>,
        latest: ReachabilityState,
        settings: PollerSettings,
    ) -> Self {
        Self {
            probe,
            hub,
            latest,
            settings,
        }
    }

    /// Starts the poller on the current runtime.
    #[must_use]
    pub fn spawn(self) -> PollerHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            addr = %self.probe.target(),
            interval_ms = self.settings.interval.as_millis(),
            "reachability poller starting"
        );

        tokio::select! {
            () = sleep(self.settings.startup_delay) => {}
            _ = shutdown.changed() => return,
        }

        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous: Option<bool> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let snapshot = self.check().await;
            log_transition(previous, &snapshot);
            previous = Some(snapshot.reachable);

            *self.latest.write().await = Some(snapshot.clone());
            let delivered = self
                .hub
                .broadcast_all(&StatusMessage::update(None, StatusData::Reachability(snapshot)))
                .await;
            tracing::trace!(delivered, "reachability snapshot broadcast");
        }

        tracing::info!("reachability poller stopped");
    }

    /// Runs one probe in its own task so a panic is contained. A probe that
    /// outlives the timeout is aborted, so no attempt survives its tick.
    async fn check(&self) -> StatusSnapshot {
        let probe = Arc::clone(&self.probe);
        let target = probe.target();
        let started = Instant::now();
        let mut attempt = tokio::spawn(async move { probe.probe().await });

        let error = match timeout(self.settings.probe_timeout, &mut attempt).await {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(reason))) => Some(reason),
            Ok(Err(join)) => Some(format!("probe aborted: {join}")),
            Err(_) => {
                attempt.abort();
                Some(format!(
                    "probe timed out after {} ms",
                    self.settings.probe_timeout.as_millis()
                ))
            }
        };

        StatusSnapshot {
            reachable: error.is_none(),
            target,
            round_trip_ms: error
                .is_none()
                .then(|| u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
            error,
            checked_at: Utc::now(),
        }
    }
}

fn log_transition(previous: Option<bool>, snapshot: &StatusSnapshot) {
    match (previous, snapshot.reachable) {
        (Some(true), true) | (Some(false), false) => {
            tracing::debug!(addr = %snapshot.target, reachable = snapshot.reachable, "controller status unchanged");
        }
        (_, true) => {
            tracing::info!(addr = %snapshot.target, "controller reachable");
        }
        (_, false) => {
            tracing::warn!(
                addr = %snapshot.target,
                error = snapshot.error.as_deref().unwrap_or("unknown"),
                "controller unreachable"
            );
        }
    }
}

/// Handle to a running poller.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signals the poller to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "reachability poller task ended abnormally");
        }
    }

    /// Returns `true` once the poller task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Debug, Default)]
    struct FailingProbe {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Probe for FailingProbe {
        fn target(&self) -> String {
            "unreachable-box:5007".to_string()
        }

        async fn probe(&self) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("host unreachable".to_string())
        }
    }

    #[derive(Debug, Default)]
    struct PanickingProbe {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Probe for PanickingProbe {
        fn target(&self) -> String {
            "broken".to_string()
        }

        async fn probe(&self) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("probe blew up");
        }
    }

    /// Never answers; `live` counts attempts still running.
    #[derive(Debug, Default)]
    struct HangingProbe {
        live: Arc<AtomicUsize>,
    }

    #[derive(Debug)]
    struct LiveGuard(Arc<AtomicUsize>);

    impl Drop for LiveGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl Probe for HangingProbe {
        fn target(&self) -> String {
            "black-hole".to_string()
        }

        async fn probe(&self) -> Result<(), String> {
            self.live.fetch_add(1, Ordering::SeqCst);
            let _guard = LiveGuard(Arc::clone(&self.live));
            sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct HealthyProbe;

    #[async_trait::async_trait]
    impl Probe for HealthyProbe {
        fn target(&self) -> String {
            "box:5007".to_string()
        }

        async fn probe(&self) -> Result<(), String> {
            Ok(())
        }
    }

    fn fast() -> PollerSettings {
        PollerSettings {
            interval: Duration::from_millis(10),
            startup_delay: Duration::ZERO,
            probe_timeout: Duration::from_millis(50),
        }
    }

    async fn wait_for(calls: &AtomicUsize, n: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if calls.load(Ordering::SeqCst) >= n {
                return true;
            }
            sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn keeps_probing_after_repeated_failures() {
        let probe = Arc::new(FailingProbe::default());
        let hub = Arc::new(ConnectionRegistry::new());
        let latest = ReachabilityState::default();
        let (tx, mut rx) = mpsc::channel(64);
        hub.add(tx).await;

        let handle = ReachabilityPoller::new(
            Arc::clone(&probe) as Arc<dyn Probe>,
            Arc::clone(&hub),
            Arc::clone(&latest),
            fast(),
        )
        .spawn();

        assert!(wait_for(&probe.calls, 11).await, "eleventh probe never ran");
        assert!(!handle.is_finished());
        handle.stop().await;

        let Some(snapshot) = latest.read().await.clone() else {
            panic!("no snapshot recorded");
        };
        assert!(!snapshot.reachable);
        assert_eq!(snapshot.error.as_deref(), Some("host unreachable"));

        let mut updates = 0;
        while let Ok(frame) = rx.try_recv() {
            let Ok(json) = serde_json::from_str::<serde_json::Value>(frame.as_str()) else {
                panic!("invalid json");
            };
            assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("status_update"));
            updates += 1;
        }
        assert!(updates >= 10);
    }

    #[tokio::test]
    async fn panicking_probe_yields_negative_snapshot() {
        let probe = Arc::new(PanickingProbe::default());
        let latest = ReachabilityState::default();
        let handle = ReachabilityPoller::new(
            Arc::clone(&probe) as Arc<dyn Probe>,
            Arc::new(ConnectionRegistry::new()),
            Arc::clone(&latest),
            fast(),
        )
        .spawn();

        assert!(wait_for(&probe.calls, 3).await);
        handle.stop().await;

        let Some(snapshot) = latest.read().await.clone() else {
            panic!("no snapshot recorded");
        };
        assert!(!snapshot.reachable);
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn hanging_probe_is_bounded_by_timeout() {
        let poller = ReachabilityPoller::new(
            Arc::new(HangingProbe::default()),
            Arc::new(ConnectionRegistry::new()),
            ReachabilityState::default(),
            fast(),
        );
        let started = Instant::now();
        let snapshot = poller.check().await;
        assert!(!snapshot.reachable);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn timed_out_checks_are_cancelled() {
        let probe = Arc::new(HangingProbe::default());
        let live = Arc::clone(&probe.live);
        let mut settings = fast();
        settings.probe_timeout = Duration::from_millis(20);
        let poller = ReachabilityPoller::new(
            probe,
            Arc::new(ConnectionRegistry::new()),
            ReachabilityState::default(),
            settings,
        );

        for _ in 0..5 {
            assert!(!poller.check().await.reachable);
        }
        sleep(Duration::from_millis(50)).await;
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn healthy_probe_reports_round_trip() {
        let poller = ReachabilityPoller::new(
            Arc::new(HealthyProbe),
            Arc::new(ConnectionRegistry::new()),
            ReachabilityState::default(),
            fast(),
        );
        let snapshot = poller.check().await;
        assert!(snapshot.reachable);
        assert!(snapshot.round_trip_ms.is_some());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn stop_during_startup_delay_returns_promptly() {
        let mut settings = fast();
        settings.startup_delay = Duration::from_secs(3600);
        let probe = Arc::new(FailingProbe::default());
        let handle = ReachabilityPoller::new(
            Arc::clone(&probe) as Arc<dyn Probe>,
            Arc::new(ConnectionRegistry::new()),
            ReachabilityState::default(),
            settings,
        )
        .spawn();

        let stopped = timeout(Duration::from_secs(1), handle.stop()).await;
        assert!(stopped.is_ok());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
