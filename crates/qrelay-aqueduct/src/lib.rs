//! Aqueduct experiment-tracking integration
//!
//! A run reads its inputs from and writes its outputs to an experiment
//! record on an Aqueduct server. This crate provides:
//!
//! - [`ExperimentStore`]: the seam to the service
//! - [`AqueductClient`]: the HTTP implementation (GraphQL lookup, REST files)
//! - [`InMemoryStore`]: an in-process implementation
//! - file helpers: [`fetch`], [`upload`], [`save_sequence_and_upload`],
//!   [`read_shots`], [`collect_counts`]
//!
//! # Example
//!
//! ```rust
//! use qrelay_aqueduct::{InMemoryStore, fetch, save_sequence_and_upload};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! store.add_experiment("EXP-1", "bell");
//! store.put_file("EXP-1", "bell.qasm", "OPENQASM 2.0;").unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let local = fetch(&store, "EXP-1", "bell.qasm", dir.path()).await.unwrap();
//! assert!(local.ends_with("bell.qasm"));
//!
//! let shots = ["00", "11"];
//! save_sequence_and_upload(&store, shots.iter().map(|s| s.chars()), "EXP-1", "shots.txt", dir.path())
//!     .await
//!     .unwrap();
//! assert_eq!(store.file("EXP-1", "shots.txt").unwrap(), b"00\n11\n");
//! # });
//! ```

pub mod client;
pub mod error;
pub mod files;
pub mod memory;
pub mod store;

pub use client::{AqueductClient, TOKEN_ENV};
pub use error::{AqueductError, AqueductResult};
pub use files::{
    ShotBit, collect_counts, fetch, read_shots, render_sequence, save_sequence_and_upload, upload,
};
pub use memory::InMemoryStore;
pub use store::{Experiment, ExperimentStore};
