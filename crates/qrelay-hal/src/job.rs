//! Jobs: how a backend names and tracks one submitted circuit.
//!
//! ```text
//!   submit() ──→ Queued ──→ Running ──→ Completed
//!                  │           ├──→ Failed(reason)
//!                  └───────────┴──→ Cancelled
//! ```
//!
//! Completed, failed and cancelled jobs never change state again.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle returned by [`crate::Backend::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `{backend}-{number}`, for backends that count their submissions.
    pub fn sequential(backend: &str, number: u64) -> Self {
        Self(format!("{backend}-{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    /// The backend gave up; carries its reason.
    Failed(String),
    Cancelled,
}

impl JobStatus {
    /// Queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Completed
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed(reason) => return write!(f, "failed ({reason})"),
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
