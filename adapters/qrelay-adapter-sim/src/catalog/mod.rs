//! Named backends, grouped by namespace.
//!
//! | Namespace | Backends |
//! |-----------|----------|
//! | `aer` | `AerSimulator`, `QasmSimulator`, `StatevectorSimulator` |
//! | `fake_provider` | `Fake5QV1`, `Fake7QPulseV1`, `Fake20QV1`, `Fake27QPulseV1` |

pub mod aer;
pub mod fake_provider;

use qrelay_hal::{BackendRegistry, HalResult};

/// Registry holding every backend of both namespaces.
///
/// Fails with `HalError::DuplicateBackend` if the namespaces ever share a name.
pub fn builtin_registry() -> HalResult<BackendRegistry> {
    let mut registry = BackendRegistry::new();
    aer::register(&mut registry)?;
    fake_provider::register(&mut registry)?;
    Ok(registry)
}
