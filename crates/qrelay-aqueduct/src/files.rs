//! Moving experiment files between Aqueduct and a local directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use qrelay_hal::Counts;
use tracing::info;

use crate::client::base_name;
use crate::error::{AqueductError, AqueductResult};
use crate::store::ExperimentStore;

/// Download `filename` from an experiment into `directory`.
///
/// Returns `directory/filename`.
pub async fn fetch(
    store: &dyn ExperimentStore,
    experiment_id: &str,
    filename: &str,
    directory: &Path,
) -> AqueductResult<PathBuf> {
    info!("Downloading file {} from experiment {}.", filename, experiment_id);
    let experiment = store.experiment_by_eid(experiment_id).await?;
    let path = store.download_file(&experiment, filename, directory).await?;
    info!("File downloaded successfully: {}", path.display());
    Ok(path)
}

/// Attach a local file to an experiment under its base name.
pub async fn upload(
    store: &dyn ExperimentStore,
    experiment_id: &str,
    path: &Path,
) -> AqueductResult<()> {
    info!("Uploading file {} to experiment {}", path.display(), experiment_id);
    base_name(path)?;
    let experiment = store.experiment_by_eid(experiment_id).await?;
    store.upload_file(&experiment, path).await
}

/// A single measured value that can be written as a decimal integer.
pub trait ShotBit {
    /// The value as a non-negative integer, or why it is not one.
    fn to_digit(&self) -> Result<u64, String>;
}

impl ShotBit for bool {
    fn to_digit(&self) -> Result<u64, String> {
        Ok(u64::from(*self))
    }
}

impl ShotBit for char {
    fn to_digit(&self) -> Result<u64, String> {
        char::to_digit(*self, 10)
            .map(u64::from)
            .ok_or_else(|| format!("'{self}' is not a decimal digit"))
    }
}

impl ShotBit for u8 {
    fn to_digit(&self) -> Result<u64, String> {
        Ok(u64::from(*self))
    }
}

impl ShotBit for u32 {
    fn to_digit(&self) -> Result<u64, String> {
        Ok(u64::from(*self))
    }
}

impl ShotBit for i32 {
    fn to_digit(&self) -> Result<u64, String> {
        u64::try_from(*self).map_err(|_| format!("{self} is negative"))
    }
}

impl ShotBit for i64 {
    fn to_digit(&self) -> Result<u64, String> {
        u64::try_from(*self).map_err(|_| format!("{self} is negative"))
    }
}

impl ShotBit for f64 {
    fn to_digit(&self) -> Result<u64, String> {
        if !self.is_finite() || self.fract() != 0.0 || *self < 0.0 || *self > u64::MAX as f64 {
            return Err(format!("{self} is not a non-negative integer"));
        }
        Ok(*self as u64)
    }
}

impl<T: ShotBit + ?Sized> ShotBit for &T {
    fn to_digit(&self) -> Result<u64, String> {
        ShotBit::to_digit(*self)
    }
}

/// Render outcomes one per line, newline terminated.
///
/// Every value is checked before anything is returned.
pub fn render_sequence<S, O, B>(sequence: S) -> AqueductResult<String>
where
    S: IntoIterator<Item = O>,
    O: IntoIterator<Item = B>,
    B: ShotBit,
{
    let mut out = String::new();
    for (line, outcome) in sequence.into_iter().enumerate() {
        for bit in outcome {
            let digit = bit
                .to_digit()
                .map_err(|e| AqueductError::Format(format!("outcome {line}: {e}")))?;
            // Writing to a String cannot fail.
            let _ = write!(out, "{digit}");
        }
        out.push('\n');
    }
    Ok(out)
}

/// Write outcomes to `directory/filename` and upload the file.
///
/// Nothing is written or uploaded when a value fails to format.
pub async fn save_sequence_and_upload<S, O, B>(
    store: &dyn ExperimentStore,
    sequence: S,
    experiment_id: &str,
    filename: &str,
    directory: &Path,
) -> AqueductResult<PathBuf>
where
    S: IntoIterator<Item = O>,
    O: IntoIterator<Item = B>,
    B: ShotBit,
{
    let content = render_sequence(sequence)?;
    let path = directory.join(filename);
    tokio::fs::write(&path, content).await?;
    upload(store, experiment_id, &path).await?;
    Ok(path)
}

/// Non-blank lines of a shots file, trimmed, in file order.
///
/// A zero-width outcome is written as an empty line, so it is not read back.
pub fn read_shots(path: &Path) -> AqueductResult<Vec<String>> {
    info!("Collecting shots from file {}.", path.display());
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Frequency of each outcome in a shots file.
pub fn collect_counts(path: &Path) -> AqueductResult<Counts> {
    Ok(read_shots(path)?.into_iter().collect())
}
