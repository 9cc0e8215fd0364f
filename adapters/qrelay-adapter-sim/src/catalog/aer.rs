//! Ideal simulators: universal basis, all-to-all connectivity, no noise.

use qrelay_compile::Target;
use qrelay_hal::{Backend, BackendRegistry, HalResult};

use crate::simulator::SimulatorBackend;

pub const NAMESPACE: &str = "aer";

/// Register width every ideal target accepts.
///
/// Only the qubits a circuit acts on are simulated, so the real limit is
/// [`crate::MAX_ACTIVE_QUBITS`], checked at submission.
pub const MAX_QUBITS: u32 = 1024;

/// Backend names in this namespace.
pub const BACKENDS: [&str; 3] = ["AerSimulator", "QasmSimulator", "StatevectorSimulator"];

/// Construct an ideal simulator with the given name.
pub fn backend(name: &str) -> SimulatorBackend {
    SimulatorBackend::new(Target::ideal(name, MAX_QUBITS))
}

pub fn register(registry: &mut BackendRegistry) -> HalResult<()> {
    for name in BACKENDS {
        registry.register_factory(NAMESPACE, name, move || {
            let boxed: Box<dyn Backend> = Box::new(backend(name));
            Ok(boxed)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aer_targets_are_ideal() {
        for name in BACKENDS {
            let backend = backend(name);
            assert_eq!(backend.name(), name);
            assert_eq!(backend.target().num_qubits(), MAX_QUBITS);
            assert!(backend.target().coupling_map().is_none());
            assert!(backend.target().basis_gates().contains("ccx"));
            assert!(backend.noise().is_ideal());
        }
    }
}
