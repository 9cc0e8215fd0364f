//! The simulation runner: circuit file in, measurement outcomes out.
//!
//! ```text
//!   parse ──→ reverse_bits ──→ resolve backend ──→ transpile ──→ run
//! ```
//!
//! Every failure is fatal and aborts the run.

use std::path::{Path, PathBuf};

use qrelay_compile::{CompileError, transpile};
use qrelay_hal::{BackendRegistry, Counts, HalError, RunOptions};
use qrelay_qasm::{ParseError, QasmVersion, parse_file};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors from a simulation run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    #[error("Invalid shot count {0}: must be a positive 32-bit integer")]
    InvalidShots(i64),

    #[error("Failed to load circuit: {0}")]
    Parse(#[from] ParseError),

    #[error("Transpilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Backend(#[from] HalError),

    #[error("Backend '{0}' returned no per-shot outcomes")]
    MissingMemory(String),
}

pub type RunResult<T> = Result<T, RunError>;

/// One simulation job.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub circuit_path: PathBuf,
    pub backend: String,
    pub shots: i64,
    pub save_shots: bool,
    pub qasm_version: QasmVersion,
}

impl SimulationRequest {
    /// A QASM 2 request without per-shot memory.
    pub fn new(circuit_path: impl Into<PathBuf>, backend: impl Into<String>, shots: i64) -> Self {
        Self {
            circuit_path: circuit_path.into(),
            backend: backend.into(),
            shots,
            save_shots: false,
            qasm_version: QasmVersion::V2,
        }
    }

    pub fn with_save_shots(mut self, save_shots: bool) -> Self {
        self.save_shots = save_shots;
        self
    }

    pub fn with_qasm_version(mut self, version: QasmVersion) -> Self {
        self.qasm_version = version;
        self
    }

    fn shots(&self) -> RunResult<u32> {
        u32::try_from(self.shots)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(RunError::InvalidShots(self.shots))
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    /// Aggregate outcome frequencies, always present.
    pub counts: Counts,
    /// Outcome of every shot in order; empty unless shots were saved.
    pub memory: Vec<String>,
    pub execution_time_ms: Option<u64>,
}

/// Load, transpile and simulate a circuit file.
///
/// Outcome strings are little-endian: the circuit's bit order is reversed
/// after parsing, so classical bit 0 is printed first.
#[instrument(skip(registry), fields(backend = %request.backend, shots = request.shots))]
pub async fn simulate(
    request: &SimulationRequest,
    registry: &BackendRegistry,
) -> RunResult<SimulationOutput> {
    let shots = request.shots()?;

    let circuit = load_circuit(&request.circuit_path, request.qasm_version)?.reverse_bits();

    let backend = registry.create(&request.backend)?;
    debug!("Resolved backend {}", backend.name());

    let transpiled = transpile(&circuit, backend.target())?;
    debug!(
        "Transpiled for {}: {} ops, depth {}",
        backend.target().name(),
        transpiled.num_ops(),
        transpiled.depth()
    );

    let options = RunOptions::new(shots).with_memory(request.save_shots);
    let result = backend.run(&transpiled, &options).await?;

    info!("Counts: {}", summarize(&result.counts));

    let memory = if request.save_shots {
        result
            .memory
            .ok_or_else(|| RunError::MissingMemory(request.backend.clone()))?
    } else {
        Vec::new()
    };

    Ok(SimulationOutput {
        counts: result.counts,
        memory,
        execution_time_ms: result.execution_time_ms,
    })
}

fn load_circuit(path: &Path, version: QasmVersion) -> RunResult<qrelay_ir::Circuit> {
    let circuit = parse_file(path, version)?;
    debug!(
        "Loaded {}: {} qubits, {} clbits, {} ops",
        path.display(),
        circuit.num_qubits(),
        circuit.num_clbits(),
        circuit.num_ops()
    );
    if !circuit.instructions().iter().any(|inst| inst.is_measure()) {
        warn!("{} has no measurements; every shot is empty", path.display());
    }
    Ok(circuit)
}

/// `{'00': 51, '11': 49}`, ordered by bitstring.
fn summarize(counts: &Counts) -> String {
    let entries: Vec<_> = counts
        .sorted()
        .into_iter()
        .map(|(bits, n)| format!("'{bits}': {n}"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}
