//! Concurrent execution of rotation jobs
//!
//! Every job gets its own tokio task. All tasks are spawned up front and the
//! runner waits for every one of them before producing a [`RunReport`]; jobs
//! share no state, so nothing beyond the join is needed.

mod builder;

pub use builder::{build_job, build_jobs};

use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::observability::RunMetrics;
use crate::rotate::{JobError, RotationJob, RotationResult, RotationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Rotate files that are due.
    Execute,
    /// Only report which files would be rotated.
    DryRun,
}

pub struct JobRunner {
    jobs: Vec<Arc<RotationJob>>,
    metrics: Arc<RunMetrics>,
}

impl JobRunner {
    pub fn new(jobs: Vec<RotationJob>) -> Self {
        Self {
            jobs: jobs.into_iter().map(Arc::new).collect(),
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    /// Build one job per configured project; any invalid project aborts.
    pub fn from_config(config: &Config) -> Result<Self, JobError> {
        let jobs = build_jobs(&config.projects)?;
        info!(jobs = jobs.len(), "rotation jobs built");
        Ok(Self::new(jobs))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Run every job concurrently and wait for all of them.
    pub async fn run(&self, mode: RunMode) -> RunReport {
        let handles: Vec<(String, JoinHandle<RotationResult>)> = self
            .jobs
            .iter()
            .map(|job| {
                let job = Arc::clone(job);
                let name = job.name().to_string();
                debug!(job = %name, ?mode, "running job");
                let handle = tokio::spawn(async move {
                    match mode {
                        RunMode::Execute => job.run().await,
                        RunMode::DryRun => job.test().await,
                    }
                });
                (name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(job = %name, error = %e, "job task aborted");
                    RotationResult::fail(&name, format!("job task aborted: {e}"))
                }
            };
            info!(job = %result.name(), status = %result.status(), error = ?result.error(), "result");
            self.metrics.record(result.status());
            results.push(result);
        }

        let report = RunReport::new(mode, results);
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "run complete"
        );
        report
    }
}

/// Aggregate of one run, one result per job.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<RotationResult>,
}

impl RunReport {
    pub fn new(mode: RunMode, results: Vec<RotationResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status() == status).count();
        Self {
            dry_run: mode == RunMode::DryRun,
            succeeded: count(RotationStatus::Success),
            failed: count(RotationStatus::Fail),
            skipped: count(RotationStatus::Skip),
            results,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn get(&self, name: &str) -> Option<&RotationResult> {
        self.results.iter().find(|r| r.name() == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
