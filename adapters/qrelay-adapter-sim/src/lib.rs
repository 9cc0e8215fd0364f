//! qrelay local statevector simulator
//!
//! Provides [`SimulatorBackend`], a [`qrelay_hal::Backend`] that simulates
//! circuits exactly (or with a stochastic [`NoiseProfile`]), and the
//! [`catalog`] of named backends the runner chooses from.
//!
//! # Execution paths
//!
//! - **Sampled**: every measurement is terminal, nothing is conditional,
//!   no reset and no noise. The state is prepared once and all shots are
//!   drawn from it.
//! - **Trajectory**: anything else. Each shot runs on a fresh state with
//!   projective measurement, reset, classical conditions and noise.
//!
//! Only qubits an instruction touches are simulated.
//!
//! | Active qubits | Memory |
//! |---------------|--------|
//! | 10 | ~16 KB |
//! | 20 | ~16 MB |
//! | 24 | ~256 MB |
//!
//! # Example
//!
//! ```rust
//! use qrelay_adapter_sim::catalog::builtin_registry;
//! use qrelay_hal::RunOptions;
//! use qrelay_ir::Circuit;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let registry = builtin_registry().unwrap();
//! let backend = registry.create("AerSimulator").unwrap();
//!
//! let circuit = qrelay_compile::transpile(&Circuit::bell().unwrap(), backend.target()).unwrap();
//! let result = backend.run(&circuit, &RunOptions::new(100)).await.unwrap();
//! assert_eq!(result.counts.get("00") + result.counts.get("11"), 100);
//! # });
//! ```

pub mod catalog;
mod noise;
mod simulator;
mod statevector;

pub use catalog::builtin_registry;
pub use noise::NoiseProfile;
pub use simulator::{MAX_ACTIVE_QUBITS, SimulatorBackend};
pub use statevector::Statevector;
