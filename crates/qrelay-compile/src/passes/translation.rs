//! Basis translation to `rz`/`sx`/`x`/`cx`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use qrelay_ir::{Circuit, StandardGate};

use super::derived_gate;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::property::{BasisGates, PropertySet};

const EPS: f64 = 1e-12;

/// Basis translation pass.
///
/// Gates already in the target basis are kept. Everything else is rewritten
/// for an IBM-style basis: two-qubit gates through `cx`, one-qubit gates
/// through `U(θ,φ,λ) = RZ(φ+π)·SX·RZ(θ+π)·SX·RZ(λ)` (up to global phase).
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        let mut out = circuit.empty_like();
        for inst in circuit.instructions() {
            match inst.as_gate() {
                Some(gate) if !basis.contains(gate.name()) => {
                    for (g, operands) in translate(gate.kind, basis)? {
                        let qubits = operands.into_iter().map(|i| inst.qubits[i]);
                        out.apply(derived_gate(gate, g, qubits))?;
                    }
                }
                _ => {
                    out.apply(inst.clone())?;
                }
            }
        }

        *circuit = out;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.basis_gates.as_ref().is_some_and(|basis| {
            circuit
                .instructions()
                .iter()
                .filter_map(|i| i.as_gate())
                .any(|g| !basis.contains(g.name()))
        })
    }
}

/// Rewrite one gate as basis gates over operand positions.
fn translate(
    gate: StandardGate,
    basis: &BasisGates,
) -> CompileResult<Vec<(StandardGate, Vec<usize>)>> {
    match gate.num_qubits() {
        1 => Ok(one_qubit(gate, basis)?
            .into_iter()
            .map(|g| (g, vec![0]))
            .collect()),
        2 if basis.contains("cx") => {
            let mut out = Vec::new();
            for (g, operands) in via_cx(gate) {
                if basis.contains(g.name()) {
                    out.push((g, operands));
                } else {
                    for g1 in one_qubit(g, basis)? {
                        out.push((g1, operands.clone()));
                    }
                }
            }
            Ok(out)
        }
        _ => Err(CompileError::GateNotInBasis(gate.name().to_string())),
    }
}

/// One-qubit gate as `rz`/`sx` (or itself when native).
fn one_qubit(gate: StandardGate, basis: &BasisGates) -> CompileResult<Vec<StandardGate>> {
    if basis.contains(gate.name()) {
        return Ok(vec![gate]);
    }
    if gate == StandardGate::I {
        return Ok(vec![]);
    }

    let params = u_params(gate);
    let (theta, phi, lambda) = match params {
        Some(p) if basis.contains("rz") && basis.contains("sx") => p,
        _ => return Err(CompileError::GateNotInBasis(gate.name().to_string())),
    };

    if is_zero(theta) {
        let angle = phi + lambda;
        return Ok(if is_zero(angle) {
            vec![]
        } else {
            vec![StandardGate::Rz(angle)]
        });
    }

    Ok(vec![
        StandardGate::Rz(lambda),
        StandardGate::SX,
        StandardGate::Rz(theta + PI),
        StandardGate::SX,
        StandardGate::Rz(phi + PI),
    ])
}

/// Euler angles of a one-qubit gate, up to global phase.
fn u_params(gate: StandardGate) -> Option<(f64, f64, f64)> {
    Some(match gate {
        StandardGate::I => (0.0, 0.0, 0.0),
        StandardGate::X => (PI, 0.0, PI),
        StandardGate::Y => (PI, FRAC_PI_2, FRAC_PI_2),
        StandardGate::Z => (0.0, 0.0, PI),
        StandardGate::H => (FRAC_PI_2, 0.0, PI),
        StandardGate::S => (0.0, 0.0, FRAC_PI_2),
        StandardGate::Sdg => (0.0, 0.0, -FRAC_PI_2),
        StandardGate::T => (0.0, 0.0, FRAC_PI_4),
        StandardGate::Tdg => (0.0, 0.0, -FRAC_PI_4),
        StandardGate::SX => (FRAC_PI_2, -FRAC_PI_2, FRAC_PI_2),
        StandardGate::SXdg => (FRAC_PI_2, FRAC_PI_2, -FRAC_PI_2),
        StandardGate::Rx(t) => (t, -FRAC_PI_2, FRAC_PI_2),
        StandardGate::Ry(t) => (t, 0.0, 0.0),
        StandardGate::Rz(t) | StandardGate::P(t) => (0.0, 0.0, t),
        StandardGate::U(t, p, l) => (t, p, l),
        _ => return None,
    })
}

/// Two-qubit gate as `cx` plus one-qubit gates (qelib1 definitions).
fn via_cx(gate: StandardGate) -> Vec<(StandardGate, Vec<usize>)> {
    use StandardGate as G;
    let (a, b) = (vec![0], vec![1]);
    let cx = || (G::CX, vec![0, 1]);

    match gate {
        G::CY => vec![(G::Sdg, b.clone()), cx(), (G::S, b)],
        G::CZ => vec![(G::H, b.clone()), cx(), (G::H, b)],
        G::CH => vec![
            (G::H, b.clone()),
            (G::Sdg, b.clone()),
            cx(),
            (G::H, b.clone()),
            (G::T, b.clone()),
            cx(),
            (G::T, b.clone()),
            (G::H, b.clone()),
            (G::S, b.clone()),
            (G::X, b),
            (G::S, a),
        ],
        G::Swap => vec![cx(), (G::CX, vec![1, 0]), cx()],
        G::CRz(t) => vec![(G::Rz(t / 2.0), b.clone()), cx(), (G::Rz(-t / 2.0), b), cx()],
        G::CRy(t) => vec![(G::Ry(t / 2.0), b.clone()), cx(), (G::Ry(-t / 2.0), b), cx()],
        G::CRx(t) => vec![
            (G::P(FRAC_PI_2), b.clone()),
            cx(),
            (G::U(-t / 2.0, 0.0, 0.0), b.clone()),
            cx(),
            (G::U(t / 2.0, -FRAC_PI_2, 0.0), b),
        ],
        G::CP(l) => vec![
            (G::P(l / 2.0), a),
            cx(),
            (G::P(-l / 2.0), b.clone()),
            cx(),
            (G::P(l / 2.0), b),
        ],
        G::RZZ(t) => vec![cx(), (G::Rz(t), b), cx()],
        G::RXX(t) => vec![
            (G::H, a.clone()),
            (G::H, b.clone()),
            cx(),
            (G::Rz(t), b.clone()),
            cx(),
            (G::H, a),
            (G::H, b),
        ],
        other => vec![(other, vec![0, 1])],
    }
}

/// Whether an angle is a multiple of 2π.
fn is_zero(angle: f64) -> bool {
    let r = angle.rem_euclid(TAU);
    r < EPS || TAU - r < EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_equivalent, unitary};
    use qrelay_ir::{ClassicalCondition, Instruction, QubitId};

    fn translate_circuit(circuit: &Circuit, basis: BasisGates) -> CompileResult<Circuit> {
        let mut out = circuit.clone();
        let mut props = PropertySet {
            basis_gates: Some(basis),
            ..PropertySet::default()
        };
        BasisTranslation.run(&mut out, &mut props)?;
        Ok(out)
    }

    fn single(gate: StandardGate) -> Circuit {
        let mut circuit = Circuit::with_size("t", gate.num_qubits(), 0);
        let qubits: Vec<_> = (0..gate.num_qubits()).map(QubitId).collect();
        circuit.apply(Instruction::gate(gate, qubits)).unwrap();
        circuit
    }

    fn all_gates() -> Vec<StandardGate> {
        use StandardGate as G;
        vec![
            G::I, G::X, G::Y, G::Z, G::H, G::S, G::Sdg, G::T, G::Tdg, G::SX, G::SXdg,
            G::Rx(0.7), G::Ry(-1.3), G::Rz(2.1), G::P(0.4), G::U(0.3, -0.8, 1.9),
            G::CX, G::CY, G::CZ, G::CH, G::Swap, G::CRx(0.9), G::CRy(-0.6), G::CRz(1.7),
            G::CP(-2.2), G::RXX(0.5), G::RZZ(1.1),
        ]
    }

    #[test]
    fn test_ibm_translation_is_exact() {
        let basis = BasisGates::ibm();
        for gate in all_gates() {
            let circuit = single(gate);
            let out = translate_circuit(&circuit, basis.clone()).unwrap();
            for inst in out.instructions() {
                assert!(basis.contains(inst.name()), "{} left {}", gate.name(), inst.name());
            }
            assert_equivalent(&unitary(&circuit), &unitary(&out));
        }
    }

    #[test]
    fn test_diagonal_gates_become_single_rz() {
        let out = translate_circuit(&single(StandardGate::T), BasisGates::ibm()).unwrap();
        assert_eq!(out.num_ops(), 1);
        assert_eq!(out.instructions()[0].name(), "rz");

        let out = translate_circuit(&single(StandardGate::P(TAU)), BasisGates::ibm()).unwrap();
        assert_eq!(out.num_ops(), 0);
    }

    #[test]
    fn test_condition_carried_to_every_gate() {
        let mut circuit = Circuit::with_size("t", 2, 1);
        circuit
            .conditional(StandardGate::CZ, [QubitId(0), QubitId(1)], ClassicalCondition::new("c", 1))
            .unwrap();
        let out = translate_circuit(&circuit, BasisGates::ibm()).unwrap();
        assert!(out.num_ops() > 1);
        assert!(out.instructions().iter().all(|i| i.condition().is_some()));
    }

    #[test]
    fn test_unknown_basis_rejected() {
        let err = translate_circuit(&single(StandardGate::H), BasisGates::new(["cz", "prx"]))
            .unwrap_err();
        assert!(matches!(err, CompileError::GateNotInBasis(ref g) if g == "h"));

        let err = translate_circuit(&single(StandardGate::CZ), BasisGates::new(["rz", "sx"]))
            .unwrap_err();
        assert!(matches!(err, CompileError::GateNotInBasis(ref g) if g == "cz"));
    }

    #[test]
    fn test_is_zero() {
        assert!(is_zero(0.0));
        assert!(is_zero(TAU));
        assert!(is_zero(-TAU));
        assert!(!is_zero(PI));
    }
}
