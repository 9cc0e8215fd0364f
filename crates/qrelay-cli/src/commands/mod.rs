//! CLI command implementations.

pub mod backends;
pub mod plot;
pub mod simulate;
