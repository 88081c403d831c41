//! Operator activity log.
//!
//! Records who did what, fire-and-forget. The default sink writes through
//! `tracing` under the `activity` target so deployments can route it with
//! an `EnvFilter` directive such as `activity=info`.

use std::fmt;

use serde::Serialize;

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Routine operation.
    Info,
    /// Something an operator should look at.
    Warning,
    /// An operation failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Sink for `(actor, message, severity)` entries. Must never block or fail.
pub trait ActivityLog: Send + Sync + fmt::Debug {
    /// Records one entry.
    fn record(&self, actor: &str, message: &str, severity: Severity);
}

/// [`ActivityLog`] backed by `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(&self, actor: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "activity", actor, "{message}"),
            Severity::Warning => tracing::warn!(target: "activity", actor, "{message}"),
            Severity::Error => tracing::error!(target: "activity", actor, "{message}"),
        }
    }
}
