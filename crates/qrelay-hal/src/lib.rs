//! qrelay backend abstraction
//!
//! Everything the runner needs to know about a simulator or device:
//!
//! - the [`Backend`] trait for job submission and retrieval
//! - [`RunOptions`] (shots and per-shot memory)
//! - [`ExecutionResult`] and [`Counts`], with outcome strings printed
//!   highest classical bit first
//! - a [`BackendRegistry`] mapping names to constructors
//!
//! Backends advertise a [`qrelay_compile::Target`]; circuits are transpiled
//! for it before submission.
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use qrelay_hal::{Backend, ExecutionResult, HalResult, JobId, JobStatus, RunOptions};
//! use qrelay_compile::Target;
//! use qrelay_ir::Circuit;
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     target: Target,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!     fn target(&self) -> &Target { &self.target }
//!
//!     async fn submit(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<JobId> {
//!         todo!()
//!     }
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> { todo!() }
//!     async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> { todo!() }
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> { todo!() }
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{Backend, RunOptions};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use registry::{BackendEntry, BackendRegistry};
pub use result::{Counts, ExecutionResult, format_bitstring};
