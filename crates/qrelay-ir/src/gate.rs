//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Angles are concrete radians; symbolic parameters are resolved by the
/// loader before a circuit is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Paulis and Cliffords
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    /// Square root of X.
    SX,
    SXdg,

    // Rotations (radians)
    Rx(f64),
    Ry(f64),
    Rz(f64),
    P(f64),
    /// `U(θ, φ, λ)`, the general one-qubit unitary.
    U(f64, f64, f64),

    // Two qubits; controls come first
    CX,
    CY,
    CZ,
    CH,
    Swap,
    CRx(f64),
    CRy(f64),
    CRz(f64),
    CP(f64),
    RXX(f64),
    RZZ(f64),

    // Three qubits
    /// Toffoli.
    CCX,
    /// Fredkin.
    CSwap,
}

impl StandardGate {
    /// Lower-case QASM name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "id",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::T => "t",
            Self::Tdg => "tdg",
            Self::SX => "sx",
            Self::SXdg => "sxdg",
            Self::Rx(_) => "rx",
            Self::Ry(_) => "ry",
            Self::Rz(_) => "rz",
            Self::P(_) => "p",
            Self::U(_, _, _) => "u",
            Self::CX => "cx",
            Self::CY => "cy",
            Self::CZ => "cz",
            Self::CH => "ch",
            Self::Swap => "swap",
            Self::CRx(_) => "crx",
            Self::CRy(_) => "cry",
            Self::CRz(_) => "crz",
            Self::CP(_) => "cp",
            Self::RXX(_) => "rxx",
            Self::RZZ(_) => "rzz",
            Self::CCX => "ccx",
            Self::CSwap => "cswap",
        }
    }

    /// Operand count.
    pub fn num_qubits(&self) -> u32 {
        match self {
            Self::I
            | Self::X
            | Self::Y
            | Self::Z
            | Self::H
            | Self::S
            | Self::Sdg
            | Self::T
            | Self::Tdg
            | Self::SX
            | Self::SXdg
            | Self::Rx(_)
            | Self::Ry(_)
            | Self::Rz(_)
            | Self::P(_)
            | Self::U(_, _, _) => 1,

            Self::CX
            | Self::CY
            | Self::CZ
            | Self::CH
            | Self::Swap
            | Self::CRx(_)
            | Self::CRy(_)
            | Self::CRz(_)
            | Self::CP(_)
            | Self::RXX(_)
            | Self::RZZ(_) => 2,

            Self::CCX | Self::CSwap => 3,
        }
    }

    /// Get the angle parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            Self::Rx(p)
            | Self::Ry(p)
            | Self::Rz(p)
            | Self::P(p)
            | Self::CRx(p)
            | Self::CRy(p)
            | Self::CRz(p)
            | Self::CP(p)
            | Self::RXX(p)
            | Self::RZZ(p) => vec![p],

            Self::U(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }
}

/// Classical condition for conditional gates: `if (register == value)`.
///
/// The register value reads element 0 as the least significant bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassicalCondition {
    pub register: String,
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

/// A gate together with its optional classical guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: StandardGate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Create a new unconditional gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: gate,
            condition: None,
        }
    }

    /// Add a classical condition to the gate.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}
