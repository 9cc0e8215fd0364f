//! Three-qubit gate decomposition.

use qrelay_ir::{Circuit, StandardGate};

use super::derived_gate;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::property::PropertySet;

/// Rewrites `ccx` and `cswap` into one- and two-qubit gates unless the
/// target executes them natively.
pub struct Decompose;

impl Pass for Decompose {
    fn name(&self) -> &'static str {
        "Decompose"
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let native = |name: &str| {
            properties
                .basis_gates
                .as_ref()
                .is_some_and(|b| b.contains(name))
        };

        let mut out = circuit.empty_like();
        for inst in circuit.instructions() {
            let expansion = inst
                .as_gate()
                .filter(|g| !native(g.name()))
                .and_then(|g| expand(g.kind).map(|steps| (g, steps)));

            match expansion {
                Some((gate, steps)) => {
                    for (g, operands) in steps {
                        let qubits = operands.into_iter().map(|i| inst.qubits[i]);
                        out.apply(derived_gate(gate, g, qubits))?;
                    }
                }
                None => {
                    out.apply(inst.clone())?;
                }
            }
        }

        *circuit = out;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, _properties: &PropertySet) -> bool {
        circuit.instructions().iter().any(|i| i.qubits.len() == 3 && i.is_gate())
    }
}

fn expand(gate: StandardGate) -> Option<Vec<(StandardGate, Vec<usize>)>> {
    match gate {
        StandardGate::CCX => Some(toffoli(0, 1, 2)),
        StandardGate::CSwap => {
            let mut steps = vec![(StandardGate::CX, vec![2, 1])];
            steps.extend(toffoli(0, 1, 2));
            steps.push((StandardGate::CX, vec![2, 1]));
            Some(steps)
        }
        _ => None,
    }
}

/// Standard six-CNOT Toffoli over operand positions.
fn toffoli(a: usize, b: usize, c: usize) -> Vec<(StandardGate, Vec<usize>)> {
    use StandardGate::{CX, H, T, Tdg};
    vec![
        (H, vec![c]),
        (CX, vec![b, c]),
        (Tdg, vec![c]),
        (CX, vec![a, c]),
        (T, vec![c]),
        (CX, vec![b, c]),
        (Tdg, vec![c]),
        (CX, vec![a, c]),
        (T, vec![b]),
        (T, vec![c]),
        (H, vec![c]),
        (CX, vec![a, b]),
        (T, vec![a]),
        (Tdg, vec![b]),
        (CX, vec![a, b]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, Target};
    use crate::testing::{assert_equivalent, unitary};
    use qrelay_ir::{ClassicalCondition, QubitId};

    fn decompose(circuit: &Circuit, target: &Target) -> Circuit {
        let mut out = circuit.clone();
        let mut props = PropertySet::new().with_target(target);
        Decompose.run(&mut out, &mut props).unwrap();
        out
    }

    #[test]
    fn test_toffoli_decomposition_is_exact() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let out = decompose(&circuit, &Target::new("t", 3, BasisGates::ibm()));

        assert!(out.instructions().iter().all(|i| i.qubits.len() <= 2));
        assert_eq!(out.count_ops()["cx"], 6);
        assert_equivalent(&unitary(&circuit), &unitary(&out));
    }

    #[test]
    fn test_fredkin_decomposition_is_exact() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit
            .apply(qrelay_ir::Instruction::gate(
                StandardGate::CSwap,
                [QubitId(2), QubitId(0), QubitId(1)],
            ))
            .unwrap();
        let out = decompose(&circuit, &Target::new("t", 3, BasisGates::ibm()));
        assert_equivalent(&unitary(&circuit), &unitary(&out));
    }

    #[test]
    fn test_native_three_qubit_gate_kept() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let out = decompose(&circuit, &Target::ideal("sim", 3));
        assert_eq!(out, circuit);
    }

    #[test]
    fn test_condition_is_inherited() {
        let mut circuit = Circuit::with_size("t", 3, 1);
        circuit
            .conditional(
                StandardGate::CCX,
                [QubitId(0), QubitId(1), QubitId(2)],
                ClassicalCondition::new("c", 1),
            )
            .unwrap();
        let out = decompose(&circuit, &Target::new("t", 3, BasisGates::ibm()));
        assert!(out.instructions().iter().all(|i| i.condition().is_some()));
    }
}
