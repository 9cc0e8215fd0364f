//! Plot command implementation.

use anyhow::Result;
use console::style;
use qrelay_aqueduct::{AqueductClient, ExperimentStore, collect_counts, fetch, upload};
use qrelay_hal::Counts;
use tempfile::TempDir;
use tracing::{info, warn};

use crate::config::PlotConfig;
use crate::histogram::render_svg;

/// Execute the plot command against the configured Aqueduct server.
pub async fn execute(config: &PlotConfig) -> Result<()> {
    let store = AqueductClient::from_env(&config.aqueduct_url, config.timeout)?;
    let counts = run(config, &store).await?;

    println!(
        "{} Uploaded {} ({} outcomes, {} shots) to experiment {}",
        style("✓").green().bold(),
        style(&config.image_file).green(),
        counts.len(),
        counts.total_shots(),
        config.experiment
    );
    Ok(())
}

/// Download a shots file, render its histogram and upload the image.
pub async fn run(config: &PlotConfig, store: &dyn ExperimentStore) -> Result<Counts> {
    let scratch = TempDir::new()?;

    let shots = fetch(store, &config.experiment, &config.shots_file, scratch.path()).await?;
    let counts = collect_counts(&shots)?;
    if counts.is_empty() {
        warn!("{} holds no shots; the histogram will be empty", config.shots_file);
    }

    let image = scratch.path().join(&config.image_file);
    info!(
        "Plotting image {}: {}x{}.",
        image.display(),
        config.width,
        config.height
    );
    tokio::fs::write(&image, render_svg(&counts, config.width, config.height)).await?;

    upload(store, &config.experiment, &image).await?;
    Ok(counts)
}
