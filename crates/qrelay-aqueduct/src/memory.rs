//! In-process experiment store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::client::base_name;
use crate::error::{AqueductError, AqueductResult};
use crate::store::{Experiment, ExperimentStore};

#[derive(Debug, Default)]
struct Record {
    experiment: Option<Experiment>,
    files: FxHashMap<String, Vec<u8>>,
}

/// An [`ExperimentStore`] that keeps experiments and their files in memory.
///
/// Useful for offline runs and for exercising the pipeline without a server.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<FxHashMap<String, Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an experiment with the given EID.
    pub fn add_experiment(&self, eid: &str, title: &str) -> Experiment {
        let experiment = Experiment {
            uuid: format!("mem-{eid}"),
            eid: eid.to_string(),
            title: title.to_string(),
        };
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.entry(eid.to_string()).or_default().experiment = Some(experiment.clone());
        experiment
    }

    /// Put a file into an existing experiment.
    pub fn put_file(&self, eid: &str, name: &str, content: impl Into<Vec<u8>>) -> AqueductResult<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .get_mut(eid)
            .filter(|r| r.experiment.is_some())
            .ok_or_else(|| AqueductError::NotFound(format!("experiment '{eid}'")))?;
        record.files.insert(name.to_string(), content.into());
        Ok(())
    }

    /// Contents of a stored file.
    pub fn file(&self, eid: &str, name: &str) -> Option<Vec<u8>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.get(eid).and_then(|r| r.files.get(name).cloned())
    }

    /// Names of the files attached to an experiment, sorted.
    pub fn file_names(&self, eid: &str) -> Vec<String> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = records
            .get(eid)
            .map(|r| r.files.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn lookup(&self, eid: &str) -> AqueductResult<Experiment> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .get(eid)
            .and_then(|r| r.experiment.clone())
            .ok_or_else(|| AqueductError::NotFound(format!("experiment '{eid}'")))
    }
}

#[async_trait]
impl ExperimentStore for InMemoryStore {
    async fn experiment_by_eid(&self, eid: &str) -> AqueductResult<Experiment> {
        self.lookup(eid)
    }

    async fn download_file(
        &self,
        experiment: &Experiment,
        file_name: &str,
        directory: &Path,
    ) -> AqueductResult<PathBuf> {
        let content = self.file(&experiment.eid, file_name).ok_or_else(|| {
            AqueductError::NotFound(format!(
                "file '{file_name}' in experiment '{}'",
                experiment.eid
            ))
        })?;
        let path = directory.join(file_name);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    async fn upload_file(&self, experiment: &Experiment, path: &Path) -> AqueductResult<()> {
        let name = base_name(path)?;
        let content = tokio::fs::read(path).await?;
        self.put_file(&experiment.eid, &name, content)
    }
}
