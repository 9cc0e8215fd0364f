//! Dense unitaries for checking rewrites in unit tests.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use num_complex::Complex64;
use qrelay_ir::{Circuit, StandardGate};

type C = Complex64;

fn c(re: f64, im: f64) -> C {
    C::new(re, im)
}

fn phase(angle: f64) -> C {
    C::from_polar(1.0, angle)
}

/// 2x2 matrix of a one-qubit gate, row major.
fn matrix1(gate: StandardGate) -> [[C; 2]; 2] {
    let (zero, one) = (c(0.0, 0.0), c(1.0, 0.0));
    let diag = |a: C, b: C| [[a, zero], [zero, b]];
    match gate {
        StandardGate::I => diag(one, one),
        StandardGate::X => [[zero, one], [one, zero]],
        StandardGate::Y => [[zero, c(0.0, -1.0)], [c(0.0, 1.0), zero]],
        StandardGate::Z => diag(one, -one),
        StandardGate::H => {
            let h = c(FRAC_1_SQRT_2, 0.0);
            [[h, h], [h, -h]]
        }
        StandardGate::S => diag(one, phase(PI / 2.0)),
        StandardGate::Sdg => diag(one, phase(-PI / 2.0)),
        StandardGate::T => diag(one, phase(PI / 4.0)),
        StandardGate::Tdg => diag(one, phase(-PI / 4.0)),
        StandardGate::SX => [[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]],
        StandardGate::SXdg => [[c(0.5, -0.5), c(0.5, 0.5)], [c(0.5, 0.5), c(0.5, -0.5)]],
        StandardGate::Rx(t) => {
            let (co, si) = ((t / 2.0).cos(), (t / 2.0).sin());
            [[c(co, 0.0), c(0.0, -si)], [c(0.0, -si), c(co, 0.0)]]
        }
        StandardGate::Ry(t) => {
            let (co, si) = ((t / 2.0).cos(), (t / 2.0).sin());
            [[c(co, 0.0), c(-si, 0.0)], [c(si, 0.0), c(co, 0.0)]]
        }
        StandardGate::Rz(t) => diag(phase(-t / 2.0), phase(t / 2.0)),
        StandardGate::P(l) => diag(one, phase(l)),
        StandardGate::U(t, p, l) => {
            let (co, si) = ((t / 2.0).cos(), (t / 2.0).sin());
            [
                [c(co, 0.0), -phase(l) * si],
                [phase(p) * si, phase(p + l) * co],
            ]
        }
        other => panic!("{} is not a one-qubit gate", other.name()),
    }
}

/// Target gate of a controlled two-qubit gate.
fn controlled_target(gate: StandardGate) -> Option<StandardGate> {
    Some(match gate {
        StandardGate::CX => StandardGate::X,
        StandardGate::CY => StandardGate::Y,
        StandardGate::CZ => StandardGate::Z,
        StandardGate::CH => StandardGate::H,
        StandardGate::CRx(t) => StandardGate::Rx(t),
        StandardGate::CRy(t) => StandardGate::Ry(t),
        StandardGate::CRz(t) => StandardGate::Rz(t),
        StandardGate::CP(t) => StandardGate::P(t),
        _ => return None,
    })
}

fn apply1(state: &mut [C], m: [[C; 2]; 2], q: usize, control: Option<usize>) {
    let bit = 1 << q;
    for i in 0..state.len() {
        if i & bit != 0 || control.is_some_and(|ctl| i & (1 << ctl) == 0) {
            continue;
        }
        let (a, b) = (state[i], state[i | bit]);
        state[i] = m[0][0] * a + m[0][1] * b;
        state[i | bit] = m[1][0] * a + m[1][1] * b;
    }
}

fn apply(state: &mut [C], gate: StandardGate, qubits: &[usize]) {
    let bit = |i: usize, q: usize| (i >> q) & 1;
    match gate.num_qubits() {
        1 => apply1(state, matrix1(gate), qubits[0], None),
        2 => {
            if let Some(target) = controlled_target(gate) {
                apply1(state, matrix1(target), qubits[1], Some(qubits[0]));
                return;
            }
            let (a, b) = (qubits[0], qubits[1]);
            let old = state.to_vec();
            for (i, amp) in state.iter_mut().enumerate() {
                *amp = match gate {
                    StandardGate::Swap => {
                        let j = if bit(i, a) == bit(i, b) { i } else { i ^ (1 << a) ^ (1 << b) };
                        old[j]
                    }
                    StandardGate::RZZ(t) => {
                        let sign = if bit(i, a) == bit(i, b) { -1.0 } else { 1.0 };
                        old[i] * phase(sign * t / 2.0)
                    }
                    StandardGate::RXX(t) => {
                        let j = i ^ (1 << a) ^ (1 << b);
                        old[i] * (t / 2.0).cos() + old[j] * c(0.0, -(t / 2.0).sin())
                    }
                    other => panic!("unsupported two-qubit gate {}", other.name()),
                };
            }
        }
        _ => {
            let (a, b, t) = (qubits[0], qubits[1], qubits[2]);
            let old = state.to_vec();
            for (i, amp) in state.iter_mut().enumerate() {
                let j = match gate {
                    StandardGate::CCX if bit(i, a) == 1 && bit(i, b) == 1 => i ^ (1 << t),
                    StandardGate::CSwap if bit(i, a) == 1 && bit(i, b) != bit(i, t) => {
                        i ^ (1 << b) ^ (1 << t)
                    }
                    _ => i,
                };
                *amp = old[j];
            }
        }
    }
}

/// Column-major unitary of a gate-only circuit.
pub(crate) fn unitary(circuit: &Circuit) -> Vec<Vec<C>> {
    let dim = 1 << circuit.num_qubits();
    (0..dim)
        .map(|col| {
            let mut state = vec![c(0.0, 0.0); dim];
            state[col] = c(1.0, 0.0);
            for inst in circuit.instructions() {
                if let Some(gate) = inst.as_gate() {
                    let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.0 as usize).collect();
                    apply(&mut state, gate.kind, &qubits);
                }
            }
            state
        })
        .collect()
}

/// Assert two unitaries agree up to a global phase.
pub(crate) fn assert_equivalent(expected: &[Vec<C>], actual: &[Vec<C>]) {
    assert_eq!(expected.len(), actual.len(), "dimension mismatch");

    let mut global: Option<C> = None;
    for (col_e, col_a) in expected.iter().zip(actual) {
        for (e, a) in col_e.iter().zip(col_a) {
            if global.is_none() && e.norm() > 1e-9 {
                global = Some(a / e);
            }
            let g = global.unwrap_or(c(1.0, 0.0));
            assert!((e * g - a).norm() < 1e-9, "unitaries differ: {e} vs {a}");
        }
    }
}
