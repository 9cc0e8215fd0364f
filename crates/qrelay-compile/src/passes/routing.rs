//! Routing pass for inserting SWAP gates.

use qrelay_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::property::PropertySet;

/// Basic routing pass.
///
/// Rewrites the circuit onto physical qubits. Before each two-qubit gate
/// whose operands are not coupled, SWAPs move the first operand along a
/// shortest path until it sits next to the second; the layout follows the
/// moves so later gates, measurements and resets land on the right
/// physical qubit.
pub struct BasicRouting;

impl Pass for BasicRouting {
    fn name(&self) -> &'static str {
        "BasicRouting"
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let layout = properties
            .layout
            .as_mut()
            .ok_or(CompileError::MissingLayout)?;

        let mut out = circuit.empty_like();
        out.add_ancillas(coupling_map.num_qubits())?;
        let mut swaps = 0usize;

        for inst in circuit.instructions() {
            if inst.is_gate() && inst.qubits.len() == 2 {
                let p0 = layout.get_physical(inst.qubits[0]).ok_or(CompileError::MissingLayout)?;
                let p1 = layout.get_physical(inst.qubits[1]).ok_or(CompileError::MissingLayout)?;

                if !coupling_map.is_connected(p0, p1) {
                    let path = coupling_map
                        .shortest_path(p0, p1)
                        .ok_or(CompileError::RoutingFailed { qubit1: p0, qubit2: p1 })?;

                    // The last edge is where the gate itself runs.
                    for pair in path[..path.len() - 1].windows(2) {
                        out.apply(Instruction::gate(
                            StandardGate::Swap,
                            [QubitId(pair[0]), QubitId(pair[1])],
                        ))?;
                        layout.swap(pair[0], pair[1]);
                        swaps += 1;
                    }
                }
            }

            let mut routed = inst.clone();
            for q in &mut routed.qubits {
                *q = QubitId(layout.get_physical(*q).ok_or(CompileError::MissingLayout)?);
            }
            out.apply(routed)?;
        }

        tracing::debug!("Routing inserted {swaps} swaps");
        *circuit = out;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some() && properties.layout.is_some()
    }
}
