//! Layout pass mapping logical qubits to physical qubits.

use qrelay_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::property::{Layout, PropertySet};

/// Trivial layout pass.
///
/// Maps logical qubit i to physical qubit i. Physical qubits the circuit
/// does not use are mapped to themselves as ancillas.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;

        let num_logical = circuit.num_qubits();
        let num_physical = coupling_map.num_qubits();
        if num_logical > num_physical as usize {
            return Err(CompileError::CircuitTooLarge {
                required: num_logical,
                available: num_physical,
            });
        }

        properties.layout = Some(Layout::trivial(num_physical));
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap, Target};
    use qrelay_ir::QubitId;

    fn props(n: u32) -> PropertySet {
        PropertySet::new()
            .with_target(&Target::new("t", n, BasisGates::ibm()).with_coupling_map(CouplingMap::linear(n)))
    }

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        let mut props = props(5);

        TrivialLayout.run(&mut circuit, &mut props).unwrap();

        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.get_physical(QubitId(2)), Some(2));
        assert!(!TrivialLayout.should_run(&circuit, &props));
    }

    #[test]
    fn test_layout_too_large() {
        let mut circuit = Circuit::with_size("test", 6, 0);
        let err = TrivialLayout.run(&mut circuit, &mut props(5)).unwrap_err();
        assert!(matches!(err, CompileError::CircuitTooLarge { required: 6, available: 5 }));
    }

    #[test]
    fn test_layout_needs_coupling_map() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let err = TrivialLayout.run(&mut circuit, &mut PropertySet::new()).unwrap_err();
        assert!(matches!(err, CompileError::MissingCouplingMap));
    }
}
