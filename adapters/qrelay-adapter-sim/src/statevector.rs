//! Statevector simulation engine.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use num_complex::Complex64;
use rand::Rng;

use qrelay_ir::StandardGate;

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// A pure state over `num_qubits` qubits, qubit `k` being bit `k` of the
/// amplitude index.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply a gate to specific qubits.
    pub fn apply_gate(&mut self, gate: StandardGate, qubits: &[usize]) {
        use StandardGate as G;
        match gate {
            // Single-qubit gates
            G::I => {}
            G::X => self.apply_x(qubits[0]),
            G::Y => self.apply_y(qubits[0]),
            G::Z => self.apply_phase(qubits[0], PI),
            G::H => self.apply_h(qubits[0]),
            G::S => self.apply_phase(qubits[0], PI / 2.0),
            G::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            G::T => self.apply_phase(qubits[0], PI / 4.0),
            G::Tdg => self.apply_phase(qubits[0], -PI / 4.0),
            G::P(theta) => self.apply_phase(qubits[0], theta),
            G::Rz(theta) => self.apply_rz(qubits[0], theta),
            G::SX | G::SXdg | G::Rx(_) | G::Ry(_) | G::U(..) => {
                if let Some(m) = matrix(gate) {
                    self.apply_single(qubits[0], &m);
                }
            }

            // Two-qubit gates
            G::CX => self.apply_cx(qubits[0], qubits[1]),
            G::CZ => self.apply_cp(qubits[0], qubits[1], PI),
            G::CP(theta) => self.apply_cp(qubits[0], qubits[1], theta),
            G::Swap => self.apply_swap(qubits[0], qubits[1]),
            G::RZZ(theta) => self.apply_rzz(qubits[0], qubits[1], theta),
            G::RXX(theta) => self.apply_rxx(qubits[0], qubits[1], theta),
            G::CY | G::CH | G::CRx(_) | G::CRy(_) | G::CRz(_) => {
                if let Some(m) = controlled_matrix(gate) {
                    self.apply_controlled(qubits[0], qubits[1], &m);
                }
            }

            // Three-qubit gates
            G::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
            G::CSwap => self.apply_cswap(qubits[0], qubits[1], qubits[2]),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -I * self.amplitudes[j];
                self.amplitudes[j] = I * tmp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    /// Apply `m` to `target` on the subspace where `control` is 1.
    fn apply_controlled(&mut self, control: usize, target: usize, m: &Matrix2) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cp(&mut self, control: usize, target: usize, theta: f64) {
        let both = (1 << control) | (1 << target);
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp *= phase;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let same = Complex64::from_polar(1.0, -theta / 2.0);
        let differ = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = ((i >> q1) ^ (i >> q2)) & 1;
            *amp *= if parity == 0 { same } else { differ };
        }
    }

    fn apply_rxx(&mut self, q1: usize, q2: usize, theta: f64) {
        let flip = (1 << q1) | (1 << q2);
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            let j = i ^ flip;
            if i < j {
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    // =========================================================================
    // Three-qubit gate implementations
    // =========================================================================

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let ctrl = (1 << c1) | (1 << c2);
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl == ctrl) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, t1: usize, t2: usize) {
        let ctrl_mask = 1 << control;
        let t1_mask = 1 << t1;
        let t2_mask = 1 << t2;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & t1_mask != 0) && (i & t2_mask == 0) {
                let j = (i & !t1_mask) | t2_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Probability that `qubit` reads 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Projective measurement of one qubit; the state collapses.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> bool {
        let p1 = self.probability_one(qubit);
        let outcome = rng.r#gen::<f64>() < p1;
        self.collapse(qubit, outcome, if outcome { p1 } else { 1.0 - p1 });
        outcome
    }

    /// Measure and flip back to |0⟩ when the qubit read 1.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) {
        if self.measure(qubit, rng) {
            self.apply_x(qubit);
        }
    }

    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let scale = if probability > 0.0 {
            1.0 / probability.sqrt()
        } else {
            0.0
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = ZERO;
            }
        }
    }

    /// Running sum of basis-state probabilities, for repeated sampling.
    pub fn cumulative_probabilities(&self) -> Vec<f64> {
        let mut total = 0.0;
        self.amplitudes
            .iter()
            .map(|amp| {
                total += amp.norm_sqr();
                total
            })
            .collect()
    }

    /// Sample a basis state without collapsing.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        sample_cumulative(&self.cumulative_probabilities(), rng)
    }
}

/// Draw a basis-state index from a cumulative distribution.
pub fn sample_cumulative<R: Rng + ?Sized>(cumulative: &[f64], rng: &mut R) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r = rng.r#gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

fn matrix(gate: StandardGate) -> Option<Matrix2> {
    let half = |t: f64| ((t / 2.0).cos(), (t / 2.0).sin());
    Some(match gate {
        StandardGate::X => [[ZERO, ONE], [ONE, ZERO]],
        StandardGate::Y => [[ZERO, -I], [I, ZERO]],
        StandardGate::Z => [[ONE, ZERO], [ZERO, -ONE]],
        StandardGate::H => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            [[h, h], [h, -h]]
        }
        StandardGate::SX => {
            let (p, m) = (Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5));
            [[p, m], [m, p]]
        }
        StandardGate::SXdg => {
            let (p, m) = (Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5));
            [[m, p], [p, m]]
        }
        StandardGate::Rx(t) => {
            let (c, s) = half(t);
            let c = Complex64::new(c, 0.0);
            let n = Complex64::new(0.0, -s);
            [[c, n], [n, c]]
        }
        StandardGate::Ry(t) => {
            let (c, s) = half(t);
            [
                [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
            ]
        }
        StandardGate::Rz(t) => [
            [Complex64::from_polar(1.0, -t / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, t / 2.0)],
        ],
        StandardGate::U(theta, phi, lambda) => {
            let (c, s) = half(theta);
            [
                [
                    Complex64::new(c, 0.0),
                    -Complex64::from_polar(s, lambda),
                ],
                [
                    Complex64::from_polar(s, phi),
                    Complex64::from_polar(c, phi + lambda),
                ],
            ]
        }
        _ => return None,
    })
}

fn controlled_matrix(gate: StandardGate) -> Option<Matrix2> {
    matrix(match gate {
        StandardGate::CY => StandardGate::Y,
        StandardGate::CH => StandardGate::H,
        StandardGate::CRx(t) => StandardGate::Rx(t),
        StandardGate::CRy(t) => StandardGate::Ry(t),
        StandardGate::CRz(t) => StandardGate::Rz(t),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn assert_state(sv: &Statevector, expected: &[Complex64]) {
        for (a, e) in sv.amplitudes().iter().zip(expected) {
            assert!(approx_eq(*a, *e), "{a} != {e}");
        }
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_state(&sv, &[ONE, ZERO, ZERO, ZERO]);
        assert_eq!(sv.num_qubits(), 2);
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(StandardGate::H, &[0]);
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert_state(&sv, &[h, h]);
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(StandardGate::H, &[0]);
        sv.apply_gate(StandardGate::CX, &[0, 1]);
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert_state(&sv, &[h, ZERO, ZERO, h]);
    }

    #[test]
    fn test_qubit_order_is_little_endian() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(StandardGate::X, &[1]);
        assert!(approx_eq(sv.amplitudes()[0b010], ONE));
    }

    #[test]
    fn test_sx_squared_is_x() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(StandardGate::SX, &[0]);
        sv.apply_gate(StandardGate::SX, &[0]);
        assert!((sv.probability_one(0) - 1.0).abs() < 1e-12);

        sv.apply_gate(StandardGate::SXdg, &[0]);
        sv.apply_gate(StandardGate::SXdg, &[0]);
        assert!(sv.probability_one(0) < 1e-12);
    }

    #[test]
    fn test_u_matches_named_gates() {
        let mut a = Statevector::new(1);
        a.apply_gate(StandardGate::U(PI / 2.0, 0.0, PI), &[0]);
        let mut b = Statevector::new(1);
        b.apply_gate(StandardGate::H, &[0]);
        assert_state(&a, b.amplitudes());
    }

    #[test]
    fn test_controlled_rotation_needs_control() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(StandardGate::CRy(PI), &[0, 1]);
        assert!(sv.probability_one(1) < 1e-12);

        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::CRy(PI), &[0, 1]);
        assert!((sv.probability_one(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rxx_pi_flips_both() {
        let mut sv = Statevector::new(2);
        sv.apply_gate(StandardGate::RXX(PI), &[0, 1]);
        assert!((sv.amplitudes()[0b11].norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_toffoli_and_fredkin() {
        let mut sv = Statevector::new(3);
        sv.apply_gate(StandardGate::X, &[0]);
        sv.apply_gate(StandardGate::X, &[1]);
        sv.apply_gate(StandardGate::CCX, &[0, 1, 2]);
        assert!(approx_eq(sv.amplitudes()[0b111], ONE));

        sv.apply_gate(StandardGate::X, &[1]);
        sv.apply_gate(StandardGate::CSwap, &[0, 1, 2]);
        assert!(approx_eq(sv.amplitudes()[0b011], ONE));
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut sv = Statevector::new(2);
            sv.apply_gate(StandardGate::H, &[0]);
            sv.apply_gate(StandardGate::CX, &[0, 1]);
            let first = sv.measure(0, &mut rng);
            let second = sv.measure(1, &mut rng);
            assert_eq!(first, second);
            let norm: f64 = sv.amplitudes().iter().map(|a| a.norm_sqr()).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(1);
        sv.apply_gate(StandardGate::H, &[0]);
        sv.reset(0, &mut rng);
        assert!((sv.amplitudes()[0].norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sv = Statevector::new(2);
        sv.apply_gate(StandardGate::X, &[1]);
        for _ in 0..100 {
            assert_eq!(sv.sample(&mut rng), 0b10);
        }
    }

    #[test]
    fn test_sample_cumulative_skips_zero_probability() {
        let mut rng = StdRng::seed_from_u64(11);
        let cumulative = [0.0, 0.5, 0.5, 1.0];
        for _ in 0..200 {
            let idx = sample_cumulative(&cumulative, &mut rng);
            assert!(idx == 1 || idx == 3);
        }
    }
}
