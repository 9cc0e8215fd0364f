//! High-level circuit builder API.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId, Register};

/// A quantum circuit.
///
/// Qubits and classical bits are numbered densely from zero and grouped
/// into named registers in declaration order. Instructions are kept in
/// program order and validated as they are appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Total number of qubits.
    num_qubits: u32,
    /// Total number of classical bits.
    num_clbits: u32,
    /// Quantum registers, ordered by start index.
    qregs: Vec<Register>,
    /// Classical registers, ordered by start index.
    cregs: Vec<Register>,
    /// Program-ordered instructions.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            num_clbits: 0,
            qregs: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with one quantum register `q` and one classical
    /// register `c` of the given sizes.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.push_qreg("q", num_qubits);
        }
        if num_clbits > 0 {
            circuit.push_creg("c", num_clbits);
        }
        circuit
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        self.check_register_name(&name)?;
        let start = self.push_qreg(name, size);
        Ok((start..start + size).map(QubitId).collect())
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        self.check_register_name(&name)?;
        let start = self.push_creg(name, size);
        Ok((start..start + size).map(ClbitId).collect())
    }

    /// A circuit with the same name and registers but no instructions.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            num_clbits: self.num_clbits,
            qregs: self.qregs.clone(),
            cregs: self.cregs.clone(),
            instructions: vec![],
        }
    }

    /// Widen the circuit to `total` qubits with an `ancilla` register.
    /// Does nothing when the circuit is already that wide.
    pub fn add_ancillas(&mut self, total: u32) -> IrResult<()> {
        if total > self.num_qubits {
            self.add_qreg("ancilla", total - self.num_qubits)?;
        }
        Ok(())
    }

    fn check_register_name(&self, name: &str) -> IrResult<()> {
        if self.qregs.iter().chain(&self.cregs).any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name.to_string()));
        }
        Ok(())
    }

    fn push_qreg(&mut self, name: impl Into<String>, size: u32) -> u32 {
        let start = self.num_qubits;
        self.qregs.push(Register::new(name, start, size));
        self.num_qubits += size;
        start
    }

    fn push_creg(&mut self, name: impl Into<String>, size: u32) -> u32 {
        let start = self.num_clbits;
        self.cregs.push(Register::new(name, start, size));
        self.num_clbits += size;
        start
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, inst: &Instruction) -> IrResult<()> {
        let gate_name = || Some(inst.name().to_string());

        for q in &inst.qubits {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: gate_name(),
                });
            }
        }
        for c in &inst.clbits {
            if c.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit: *c,
                    gate_name: gate_name(),
                });
            }
        }

        if !inst.is_barrier() {
            for (i, q) in inst.qubits.iter().enumerate() {
                if inst.qubits[..i].contains(q) {
                    return Err(IrError::DuplicateQubit {
                        qubit: *q,
                        gate_name: gate_name(),
                    });
                }
            }
        }

        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits();
                let got = inst.qubits.len() as u32;
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_string(),
                        expected,
                        got,
                    });
                }
                if let Some(cond) = &gate.condition {
                    if self.creg(&cond.register).is_none() {
                        return Err(IrError::UnknownRegister(cond.register.clone()));
                    }
                }
            }
            InstructionKind::Measure => {
                if inst.qubits.len() != inst.clbits.len() || inst.qubits.is_empty() {
                    return Err(IrError::MeasureArityMismatch {
                        qubits: inst.qubits.len(),
                        clbits: inst.clbits.len(),
                    });
                }
            }
            InstructionKind::Reset => {
                if inst.qubits.len() != 1 {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: "reset".to_string(),
                        expected: 1,
                        got: inst.qubits.len() as u32,
                    });
                }
            }
            InstructionKind::Barrier => {}
        }
        Ok(())
    }

    fn gate1(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, [qubit]))
    }

    fn gate2(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, [q1, q2]))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::SX, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::P(theta), qubit)
    }

    /// Apply universal U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate1(StandardGate::U(theta, phi, lambda), qubit)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CX, control, target)
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CY, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CZ, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::Swap, q1, q2)
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate2(StandardGate::CP(theta), control, target)
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Apply a gate guarded by `if (register == value)`.
    pub fn conditional(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(
            Gate::standard(gate).with_condition(condition),
            qubits,
        ))
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into clbit `i` for every qubit that has a partner.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        for i in 0..self.num_qubits.min(self.num_clbits) {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Apply a barrier to the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    /// Apply a barrier to every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.barrier(qubits)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Quantum registers ordered by start index.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Classical registers ordered by start index.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of operations, barriers excluded.
    pub fn num_ops(&self) -> usize {
        self.instructions.iter().filter(|i| !i.is_barrier()).count()
    }

    /// Operation counts keyed by instruction name.
    pub fn count_ops(&self) -> FxHashMap<&'static str, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth: the longest chain of operations sharing a qubit or
    /// classical bit. Barriers do not count. A conditional gate depends on
    /// every bit of its register.
    pub fn depth(&self) -> usize {
        let mut qlevel = vec![0usize; self.num_qubits()];
        let mut clevel = vec![0usize; self.num_clbits()];

        for inst in &self.instructions {
            if inst.is_barrier() {
                continue;
            }
            let mut clbits: Vec<usize> = inst.clbits.iter().map(|c| c.0 as usize).collect();
            if let Some(reg) = inst.condition().and_then(|c| self.creg(&c.register)) {
                clbits.extend(reg.indices().map(|c| c as usize));
            }

            let level = inst
                .qubits
                .iter()
                .map(|q| qlevel[q.0 as usize])
                .chain(clbits.iter().map(|&c| clevel[c]))
                .max()
                .unwrap_or(0)
                + 1;

            for q in &inst.qubits {
                qlevel[q.0 as usize] = level;
            }
            for c in clbits {
                clevel[c] = level;
            }
        }

        qlevel.into_iter().chain(clevel).max().unwrap_or(0)
    }

    /// Whether any gate carries a classical condition.
    pub fn has_conditions(&self) -> bool {
        self.instructions.iter().any(|i| i.condition().is_some())
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Relabel qubit `i` as `n-1-i` and clbit `j` as `m-1-j`.
    ///
    /// Registers move with their bits, so their order is reversed as well
    /// as the order of elements inside each register. Condition values are
    /// bit-reversed over the register width to keep their meaning.
    /// Applying the transformation twice yields the original circuit.
    #[must_use]
    pub fn reverse_bits(&self) -> Self {
        let nq = self.num_qubits;
        let nc = self.num_clbits;

        let flip = |regs: &[Register], total: u32| {
            let mut out: Vec<Register> = regs
                .iter()
                .map(|r| Register::new(r.name.clone(), total - r.start - r.size, r.size))
                .collect();
            out.sort_by_key(|r| r.start);
            out
        };

        let instructions = self
            .instructions
            .iter()
            .map(|inst| {
                let mut kind = inst.kind.clone();
                if let InstructionKind::Gate(Gate {
                    condition: Some(cond),
                    ..
                }) = &mut kind
                {
                    if let Some(reg) = self.creg(&cond.register) {
                        cond.value = reverse_value(cond.value, reg.size);
                    }
                }
                Instruction {
                    kind,
                    qubits: inst.qubits.iter().map(|q| QubitId(nq - 1 - q.0)).collect(),
                    clbits: inst.clbits.iter().map(|c| ClbitId(nc - 1 - c.0)).collect(),
                }
            })
            .collect();

        Self {
            name: self.name.clone(),
            num_qubits: nq,
            num_clbits: nc,
            qregs: flip(&self.qregs, nq),
            cregs: flip(&self.cregs, nc),
            instructions,
        }
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let q0 = QubitId(0);
        let q1 = QubitId(1);

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_all()?;

        Ok(circuit)
    }
}

/// Reverse the low `width` bits of `value`. Values that do not fit the
/// register are returned unchanged since they can never match.
fn reverse_value(value: u64, width: u32) -> u64 {
    if width == 0 || width >= 64 {
        return if width == 64 { value.reverse_bits() } else { value };
    }
    if value >> width != 0 {
        return value;
    }
    value.reverse_bits() >> (64 - width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.qregs(), &[Register::new("q", 0, 3)]);
        assert_eq!(circuit.creg("c"), Some(&Register::new("c", 0, 2)));
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let a = circuit.add_qreg("a", 2).unwrap();
        let b = circuit.add_qreg("b", 3).unwrap();
        let creg = circuit.add_creg("c", 4).unwrap();

        assert_eq!(a, vec![QubitId(0), QubitId(1)]);
        assert_eq!(b[0], QubitId(2));
        assert_eq!(creg.len(), 4);
        assert_eq!(circuit.num_qubits(), 5);

        let err = circuit.add_creg("a", 1).unwrap_err();
        assert!(matches!(err, IrError::DuplicateRegister(name) if name == "a"));
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 3); // H, CX, parallel measures
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_ops(), 1 + 4 + 5);
        assert_eq!(circuit.count_ops()["cx"], 4);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .barrier_all()
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        assert_eq!(circuit.instructions().len(), 4);
        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_apply_rejects_bad_operands() {
        let mut circuit = Circuit::with_size("test", 2, 1);

        assert!(matches!(
            circuit.h(QubitId(2)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            circuit.measure(QubitId(0), ClbitId(1)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(matches!(
            circuit.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.apply(Instruction::gate(StandardGate::CX, [QubitId(0)])),
            Err(IrError::QubitCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            circuit.conditional(StandardGate::X, [QubitId(0)], ClassicalCondition::new("m", 1)),
            Err(IrError::UnknownRegister(_))
        ));
        assert!(circuit.instructions().is_empty());
    }

    #[test]
    fn test_conditional_depth_spans_register() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit
            .conditional(StandardGate::X, [QubitId(1)], ClassicalCondition::new("c", 1))
            .unwrap();
        assert_eq!(circuit.depth(), 2);
        assert!(circuit.has_conditions());
    }

    #[test]
    fn test_reverse_bits_relabels_operands() {
        let mut circuit = Circuit::with_size("test", 3, 3);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let reversed = circuit.reverse_bits();
        assert_eq!(reversed.instructions()[0].qubits, vec![QubitId(2), QubitId(0)]);
        assert_eq!(reversed.instructions()[1].qubits, vec![QubitId(2)]);
        assert_eq!(reversed.instructions()[1].clbits, vec![ClbitId(2)]);
    }

    #[test]
    fn test_reverse_bits_reverses_register_order() {
        let mut circuit = Circuit::new("test");
        circuit.add_qreg("a", 1).unwrap();
        circuit.add_qreg("b", 2).unwrap();
        circuit.add_creg("m", 2).unwrap();
        circuit.add_creg("n", 1).unwrap();

        let reversed = circuit.reverse_bits();
        assert_eq!(
            reversed.qregs(),
            &[Register::new("b", 0, 2), Register::new("a", 2, 1)]
        );
        assert_eq!(
            reversed.cregs(),
            &[Register::new("n", 0, 1), Register::new("m", 1, 2)]
        );
    }

    #[test]
    fn test_reverse_bits_keeps_condition_meaning() {
        let mut circuit = Circuit::with_size("test", 1, 3);
        circuit
            .conditional(StandardGate::X, [QubitId(0)], ClassicalCondition::new("c", 0b001))
            .unwrap();
        let reversed = circuit.reverse_bits();
        assert_eq!(reversed.instructions()[0].condition().unwrap().value, 0b100);
        assert_eq!(reversed.reverse_bits(), circuit);
    }

    #[test]
    fn test_reverse_value() {
        assert_eq!(reverse_value(0b0011, 4), 0b1100);
        assert_eq!(reverse_value(1, 1), 1);
        assert_eq!(reverse_value(0b100, 2), 0b100);
        assert_eq!(reverse_value(7, 0), 7);
    }

    #[test]
    fn test_empty_like_and_ancillas() {
        let mut circuit = Circuit::bell().unwrap();
        let mut wide = circuit.empty_like();
        assert!(wide.instructions().is_empty());
        assert_eq!(wide.cregs(), circuit.cregs());

        wide.add_ancillas(5).unwrap();
        assert_eq!(wide.num_qubits(), 5);
        assert_eq!(wide.qregs()[1], Register::new("ancilla", 2, 3));

        circuit.add_ancillas(1).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
    }
}
