//! Backend trait and run options.
//!
//! The [`Backend`] trait covers the lifecycle of a job on one backend:
//!
//! ```text
//!   target() ──→ submit() ──→ status() ──→ result()
//!   (sync, &ref)  (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `target()` | sync | yes | `&Target` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `run()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::Duration;

use async_trait::async_trait;
use qrelay_compile::Target;
use qrelay_ir::Circuit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Options for a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Number of shots. Must be positive.
    pub shots: u32,
    /// Keep the outcome of every shot in [`ExecutionResult::memory`].
    pub memory: bool,
}

impl RunOptions {
    pub fn new(shots: u32) -> Self {
        Self {
            shots,
            memory: false,
        }
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    /// Reject a zero shot count.
    pub fn validate(&self) -> HalResult<()> {
        if self.shots == 0 {
            return Err(HalError::InvalidShots(
                "shot count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Trait for quantum backends.
///
/// - `target()` is synchronous and infallible; it is fixed at construction.
/// - `submit()` expects a circuit already transpiled for `target()` and
///   returns a job that starts in `Queued`.
/// - `result()` is only valid once `status()` reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Qubit count, basis gates and connectivity this backend executes.
    fn target(&self) -> &Target;

    /// Submit a circuit for execution.
    async fn submit(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// Polls every 50ms for up to 5 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        use tokio::time::sleep;

        let poll_interval = Duration::from_millis(50);
        let max_polls = 6000;

        for _ in 0..max_polls {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }

    /// Submit a circuit and wait for its result.
    async fn run(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<ExecutionResult> {
        options.validate()?;
        let job_id = self.submit(circuit, options).await?;
        debug!("Submitted job {} to {}", job_id, self.name());
        self.wait(&job_id).await
    }
}
