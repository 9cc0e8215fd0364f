//! Stochastic noise applied during trajectory simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use qrelay_ir::StandardGate;

use crate::statevector::Statevector;

/// Error rates of a simulated device.
///
/// After every gate each operand suffers a uniformly random Pauli error
/// with the gate's error probability. Measured bits flip with the readout
/// error probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Error probability per one-qubit gate.
    pub single_qubit_error: f64,
    /// Error probability per qubit of a multi-qubit gate.
    pub two_qubit_error: f64,
    /// Probability that a measured bit is reported flipped.
    pub readout_error: f64,
}

impl NoiseProfile {
    /// No noise at all.
    pub fn ideal() -> Self {
        Self::default()
    }

    pub fn new(single_qubit_error: f64, two_qubit_error: f64, readout_error: f64) -> Self {
        Self {
            single_qubit_error,
            two_qubit_error,
            readout_error,
        }
    }

    pub fn is_ideal(&self) -> bool {
        self.single_qubit_error == 0.0 && self.two_qubit_error == 0.0 && self.readout_error == 0.0
    }

    /// Maybe inject a Pauli error on each operand of `gate`.
    pub(crate) fn after_gate<R: Rng + ?Sized>(
        &self,
        sv: &mut Statevector,
        gate: StandardGate,
        qubits: &[usize],
        rng: &mut R,
    ) {
        let p = if gate.num_qubits() == 1 {
            self.single_qubit_error
        } else {
            self.two_qubit_error
        };
        if p <= 0.0 {
            return;
        }
        for &q in qubits {
            if rng.r#gen::<f64>() < p {
                let pauli = match rng.gen_range(0..3) {
                    0 => StandardGate::X,
                    1 => StandardGate::Y,
                    _ => StandardGate::Z,
                };
                sv.apply_gate(pauli, &[q]);
            }
        }
    }

    /// Reported value of a measured bit.
    pub(crate) fn readout<R: Rng + ?Sized>(&self, bit: bool, rng: &mut R) -> bool {
        if self.readout_error > 0.0 && rng.r#gen::<f64>() < self.readout_error {
            !bit
        } else {
            bit
        }
    }
}
