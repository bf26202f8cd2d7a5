//! Observability (run counters, tracing)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::rotate::RotationStatus;

/// Per-status counters for job results
#[derive(Debug, Default)]
pub struct RunMetrics {
    succeeded: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, status: RotationStatus) {
        let (counter, name) = match status {
            RotationStatus::Success => (&self.succeeded, "succeeded"),
            RotationStatus::Fail => (&self.failed, "failed"),
            RotationStatus::Skip => (&self.skipped, "skipped"),
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = name, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for reports.
///
/// `RUST_LOG` wins over the level implied by `verbose`.
pub fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_status() {
        let metrics = RunMetrics::new();
        metrics.record(RotationStatus::Success);
        metrics.record(RotationStatus::Success);
        metrics.record(RotationStatus::Skip);
        metrics.record(RotationStatus::Fail);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                succeeded: 2,
                failed: 1,
                skipped: 1,
            }
        );
    }
}
