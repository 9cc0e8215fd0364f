//! qrelay transpilation
//!
//! Rewrites a [`qrelay_ir::Circuit`] so that a backend can execute it. A
//! backend describes itself with a [`Target`]; [`transpile`] runs the
//! standard pipeline for it:
//!
//! 1. **Decompose**: `ccx`/`cswap` into one- and two-qubit gates
//! 2. **Layout**: logical qubit `i` on physical qubit `i`
//! 3. **Routing**: SWAP insertion along shortest paths of the coupling map
//! 4. **Translation**: everything else into the target basis
//!
//! Layout and routing only run for targets with a coupling map; gates the
//! target executes natively are never rewritten.
//!
//! # Example
//!
//! ```rust
//! use qrelay_compile::{transpile, BasisGates, CouplingMap, Target};
//! use qrelay_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("far", 3, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let target = Target::new("line", 3, BasisGates::ibm())
//!     .with_coupling_map(CouplingMap::linear(3));
//! let compiled = transpile(&circuit, &target).unwrap();
//!
//! assert!(compiled
//!     .instructions()
//!     .iter()
//!     .all(|i| target.basis_gates().contains(i.name())));
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

#[cfg(test)]
mod testing;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder, transpile};
pub use pass::Pass;
pub use property::{BasisGates, CouplingMap, Layout, PropertySet, Target};
