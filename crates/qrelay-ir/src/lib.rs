//! qrelay circuit model
//!
//! The flat circuit representation every other qrelay crate works on: the
//! QASM loader produces a [`Circuit`], the transpiler rewrites it for a
//! target and the simulator executes it.
//!
//! # Core Components
//!
//! - **Bits and registers**: [`QubitId`], [`ClbitId`] and named [`Register`]s
//! - **Gates**: [`StandardGate`] with concrete angles, optionally guarded by a
//!   [`ClassicalCondition`]
//! - **Instructions**: [`Instruction`] combining an operation with its operands
//! - **Circuit**: [`Circuit`] builder with [`Circuit::reverse_bits`] for
//!   little-endian result ordering
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qrelay_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Bit ordering
//!
//! Outcome strings are printed with the highest classical bit first.
//! [`Circuit::reverse_bits`] relabels qubit `i` as `n-1-i` and clbit `j`
//! as `m-1-j`, so after normalization the first character of an outcome
//! string is the original classical bit 0.
//!
//! ```rust
//! use qrelay_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("flip", 2, 2);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let reversed = circuit.reverse_bits();
//! assert_eq!(reversed.instructions()[0].qubits, vec![QubitId(1)]);
//! assert_eq!(reversed.reverse_bits(), circuit);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId, Register};
