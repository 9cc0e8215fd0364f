//! Transpilation errors.

use thiserror::Error;

/// Why a circuit could not be prepared for a target.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    #[error(transparent)]
    Ir(#[from] qrelay_ir::IrError),

    /// A pass needing connectivity ran on a target without a coupling map.
    #[error("Target has no coupling map")]
    MissingCouplingMap,

    /// Routing ran before a layout was chosen.
    #[error("No layout has been assigned")]
    MissingLayout,

    #[error("Target declares no basis gates")]
    MissingBasisGates,

    /// The coupling map has no path between two physical qubits.
    #[error("No path between physical qubits {qubit1} and {qubit2}")]
    RoutingFailed { qubit1: u32, qubit2: u32 },

    #[error("Gate '{0}' cannot be expressed in the target basis")]
    GateNotInBasis(String),

    #[error("Circuit needs {required} qubits, target has {available}")]
    CircuitTooLarge { required: usize, available: u32 },
}

pub type CompileResult<T> = Result<T, CompileError>;
