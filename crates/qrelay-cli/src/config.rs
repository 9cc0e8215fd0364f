//! Run configuration.
//!
//! Every option can come from a flag or from an environment variable of the
//! same name as the configuration key (`aqueduct_url`, `experiment`, ...).
//! The raw [`SimulateArgs`] / [`PlotArgs`] are validated into typed
//! [`RunConfig`] / [`PlotConfig`] values before any I/O happens.

use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};
use qrelay_qasm::{ParseError, QasmVersion};
use thiserror::Error;

/// Backend used when `simulator_type` is not set.
pub const DEFAULT_BACKEND: &str = "AerSimulator";

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Missing required configuration key '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Invalid value for 'qasm_version': {0}")]
    Dialect(#[source] ParseError),
}

// ============================================================================
// Raw arguments
// ============================================================================

/// Options of the `simulate` command.
#[derive(Debug, Clone, Default, Args)]
pub struct SimulateArgs {
    /// Aqueduct service URL
    #[arg(long, env = "aqueduct_url")]
    pub aqueduct_url: Option<String>,

    /// Experiment ID (EID) holding the circuit and receiving the results
    #[arg(long, env = "experiment")]
    pub experiment: Option<String>,

    /// Circuit file name in the experiment
    #[arg(long, env = "qasm_file")]
    pub qasm_file: Option<String>,

    /// Result file name to upload
    #[arg(long, env = "result_file")]
    pub result_file: Option<String>,

    /// Backend name
    #[arg(long, env = "simulator_type", default_value = DEFAULT_BACKEND)]
    pub simulator_type: String,

    /// OpenQASM dialect (2 or 3)
    #[arg(long, env = "qasm_version", default_value = "2")]
    pub qasm_version: String,

    /// Number of shots
    #[arg(long, env = "shots", default_value_t = 1000, allow_negative_numbers = true)]
    pub shots: i64,

    /// Keep and upload the outcome of every shot (true/false, yes/no, 1/0)
    #[arg(
        long,
        env = "memory",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub memory: bool,

    /// Service request timeout in seconds
    #[arg(long, env = "timeout", default_value_t = 10)]
    pub timeout: u64,
}

/// Options of the `plot` command.
#[derive(Debug, Clone, Default, Args)]
pub struct PlotArgs {
    /// Aqueduct service URL
    #[arg(long, env = "aqueduct_url")]
    pub aqueduct_url: Option<String>,

    /// Experiment ID (EID)
    #[arg(long, env = "experiment")]
    pub experiment: Option<String>,

    /// Shots file name in the experiment
    #[arg(long, env = "shots_file")]
    pub shots_file: Option<String>,

    /// Image file name to upload
    #[arg(long, env = "image_file")]
    pub image_file: Option<String>,

    /// Image width in pixels
    #[arg(long, env = "width", default_value_t = 1000)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, env = "height", default_value_t = 800)]
    pub height: u32,

    /// Service request timeout in seconds
    #[arg(long, env = "timeout", default_value_t = 2)]
    pub timeout: u64,
}

// ============================================================================
// Typed configuration
// ============================================================================

/// Validated configuration of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub aqueduct_url: String,
    pub experiment: String,
    pub qasm_file: String,
    pub result_file: String,
    pub simulator_type: String,
    pub qasm_version: QasmVersion,
    /// Always positive.
    pub shots: u32,
    pub memory: bool,
    pub timeout: Duration,
}

impl TryFrom<SimulateArgs> for RunConfig {
    type Error = ConfigError;

    fn try_from(args: SimulateArgs) -> Result<Self, Self::Error> {
        let aqueduct_url = required("aqueduct_url", args.aqueduct_url)?;
        let experiment = required("experiment", args.experiment)?;
        let qasm_file = file_name("qasm_file", args.qasm_file)?;
        let result_file = file_name("result_file", args.result_file)?;

        let simulator_type = args.simulator_type.trim().to_string();
        if simulator_type.is_empty() {
            return Err(ConfigError::Invalid {
                key: "simulator_type",
                reason: "empty backend name".to_string(),
            });
        }

        let qasm_version = args
            .qasm_version
            .parse::<QasmVersion>()
            .map_err(ConfigError::Dialect)?;

        Ok(Self {
            aqueduct_url,
            experiment,
            qasm_file,
            result_file,
            simulator_type,
            qasm_version,
            shots: shots(args.shots)?,
            memory: args.memory,
            timeout: timeout(args.timeout)?,
        })
    }
}

/// Validated configuration of a histogram run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub aqueduct_url: String,
    pub experiment: String,
    pub shots_file: String,
    pub image_file: String,
    pub width: u32,
    pub height: u32,
    pub timeout: Duration,
}

impl TryFrom<PlotArgs> for PlotConfig {
    type Error = ConfigError;

    fn try_from(args: PlotArgs) -> Result<Self, Self::Error> {
        let aqueduct_url = required("aqueduct_url", args.aqueduct_url)?;
        let experiment = required("experiment", args.experiment)?;
        let shots_file = file_name("shots_file", args.shots_file)?;
        let image_file = file_name("image_file", args.image_file)?;

        for (key, value) in [("width", args.width), ("height", args.height)] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be positive".to_string(),
                });
            }
        }

        Ok(Self {
            aqueduct_url,
            experiment,
            shots_file,
            image_file,
            width: args.width,
            height: args.height,
            timeout: timeout(args.timeout)?,
        })
    }
}

fn required(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// A required value that must be a bare file name, so that it stays inside
/// the scratch directory.
fn file_name(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    let name = required(key, value)?;
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("'{name}' is not a plain file name"),
        });
    }
    Ok(name)
}

fn shots(value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ConfigError::Invalid {
            key: "shots",
            reason: format!("{value} is not a positive 32-bit integer"),
        })
}

fn timeout(seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::Invalid {
            key: "timeout",
            reason: "must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(seconds))
}
