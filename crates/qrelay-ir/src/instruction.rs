//! Circuit instructions combining operations with operands.

use serde::{Deserialize, Serialize};

use crate::gate::{ClassicalCondition, Gate};
use crate::qubit::{ClbitId, QubitId};

/// What an instruction does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(Gate),
    /// Pairs `qubits[k]` with `clbits[k]`.
    Measure,
    /// Return the qubit to |0⟩.
    Reset,
    /// Ordering hint only; simulation ignores it.
    Barrier,
}

/// One step of a circuit: an operation and the bits it touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    /// Only measurements write classical bits.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    fn quantum(kind: InstructionKind, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            qubits: qubits.into_iter().collect(),
            clbits: Vec::new(),
        }
    }

    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::quantum(InstructionKind::Gate(gate.into()), qubits)
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self::quantum(InstructionKind::Reset, [qubit])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::quantum(InstructionKind::Barrier, qubits)
    }

    pub fn is_gate(&self) -> bool {
        self.as_gate().is_some()
    }

    pub fn is_measure(&self) -> bool {
        self.kind == InstructionKind::Measure
    }

    pub fn is_barrier(&self) -> bool {
        self.kind == InstructionKind::Barrier
    }

    /// The gate, unless this is a measure, reset or barrier.
    pub fn as_gate(&self) -> Option<&Gate> {
        if let InstructionKind::Gate(gate) = &self.kind {
            Some(gate)
        } else {
            None
        }
    }

    /// Classical guard of a conditional gate.
    pub fn condition(&self) -> Option<&ClassicalCondition> {
        self.as_gate()?.condition.as_ref()
    }

    /// Lower-case mnemonic as written in QASM.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }
}
