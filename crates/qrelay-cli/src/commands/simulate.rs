//! Simulate command implementation.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qrelay_adapter_sim::builtin_registry;
use qrelay_aqueduct::{AqueductClient, ExperimentStore, fetch, save_sequence_and_upload};
use qrelay_hal::BackendRegistry;
use tempfile::TempDir;
use tracing::info;

use crate::config::RunConfig;
use crate::runner::{SimulationOutput, SimulationRequest, simulate};

/// Execute the simulate command against the configured Aqueduct server.
pub async fn execute(config: &RunConfig) -> Result<()> {
    let store = AqueductClient::from_env(&config.aqueduct_url, config.timeout)?;
    let registry = builtin_registry()?;

    println!(
        "{} Simulating {} on {} ({} shots)",
        style("→").cyan().bold(),
        style(&config.qasm_file).green(),
        style(&config.simulator_type).yellow(),
        config.shots
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Running experiment {}...", config.experiment));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let output = run(config, &store, &registry).await;
    spinner.finish_and_clear();
    let output = output?;

    println!(
        "{} {} distinct outcomes over {} shots",
        style("✓").green().bold(),
        output.counts.len(),
        output.counts.total_shots()
    );
    if config.memory {
        println!(
            "  Uploaded {} to experiment {}",
            style(&config.result_file).green(),
            config.experiment
        );
    }
    Ok(())
}

/// Fetch, simulate and, when memory is requested, upload the shots file.
///
/// All files live in a scratch directory that is removed when this returns.
pub async fn run(
    config: &RunConfig,
    store: &dyn ExperimentStore,
    registry: &BackendRegistry,
) -> Result<SimulationOutput> {
    let scratch = TempDir::new()?;

    let circuit_path = fetch(store, &config.experiment, &config.qasm_file, scratch.path()).await?;

    let request =
        SimulationRequest::new(circuit_path, &config.simulator_type, i64::from(config.shots))
            .with_save_shots(config.memory)
            .with_qasm_version(config.qasm_version);
    let output = simulate(&request, registry).await?;

    if config.memory {
        save_sequence_and_upload(
            store,
            output.memory.iter().map(|shot| shot.chars()),
            &config.experiment,
            &config.result_file,
            scratch.path(),
        )
        .await?;
    }

    info!("Run of experiment {} finished", config.experiment);
    Ok(output)
}
