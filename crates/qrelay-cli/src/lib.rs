//! qrelay: Aqueduct-driven quantum circuit simulation
//!
//! A run fetches an OpenQASM circuit from an Aqueduct experiment, transpiles
//! and simulates it on a named backend, and uploads the per-shot outcomes
//! back to the same experiment.
//!
//! ```text
//!   Aqueduct ──fetch──→ scratch dir ──→ runner ──→ shots file ──upload──→ Aqueduct
//! ```
//!
//! The library half of the crate holds everything the `qrelay` binary
//! does, so it can be driven against any [`qrelay_aqueduct::ExperimentStore`].

pub mod commands;
pub mod config;
pub mod histogram;
pub mod runner;

pub use config::{ConfigError, PlotArgs, PlotConfig, RunConfig, SimulateArgs};
pub use runner::{RunError, RunResult, SimulationOutput, SimulationRequest, simulate};
