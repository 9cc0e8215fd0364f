//! The experiment-store seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AqueductResult;

/// An experiment record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    /// Internal identifier used in file URLs.
    pub uuid: String,
    /// Human-facing experiment ID.
    pub eid: String,
    #[serde(default)]
    pub title: String,
}

/// Remote storage of experiment files.
///
/// [`crate::AqueductClient`] talks to a real service; [`crate::InMemoryStore`]
/// keeps everything in process.
#[async_trait]
pub trait ExperimentStore: Send + Sync {
    /// Resolve an experiment by its EID.
    ///
    /// Fails with `AqueductError::NotFound` when no such experiment exists.
    async fn experiment_by_eid(&self, eid: &str) -> AqueductResult<Experiment>;

    /// Download `file_name` of `experiment` into `directory`.
    ///
    /// Returns `directory/file_name`.
    async fn download_file(
        &self,
        experiment: &Experiment,
        file_name: &str,
        directory: &Path,
    ) -> AqueductResult<PathBuf>;

    /// Attach the local file at `path` to `experiment` under its base name.
    async fn upload_file(&self, experiment: &Experiment, path: &Path) -> AqueductResult<()>;
}
