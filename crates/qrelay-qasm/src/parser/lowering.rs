//! AST-to-Circuit lowering.

use std::f64::consts::PI;

use qrelay_ir::{
    Circuit, ClassicalCondition, ClbitId, Gate, Instruction, QubitId, Register, StandardGate,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ast::{BitRef, GateCall, GateDef, Program, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};

/// User gates may call earlier definitions; anything deeper than this is a cycle.
const MAX_INLINE_DEPTH: usize = 64;

/// Lower an AST Program to a Circuit.
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::new();
    for stmt in &program.statements {
        lowerer.lower_statement(stmt, None)?;
    }
    debug!(
        "Lowered {} statements into {} instructions",
        program.statements.len(),
        lowerer.circuit.instructions().len()
    );
    Ok(lowerer.circuit)
}

/// Lowers AST to Circuit.
struct Lowerer {
    circuit: Circuit,
    /// Quantum registers by name.
    qregs: FxHashMap<String, Register>,
    /// Classical registers by name.
    cregs: FxHashMap<String, Register>,
    /// User gate definitions.
    gates: FxHashMap<String, GateDef>,
    /// Declared opaque gates.
    opaque: FxHashSet<String>,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            circuit: Circuit::new("qasm_circuit"),
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            gates: FxHashMap::default(),
            opaque: FxHashSet::default(),
        }
    }

    fn lower_statement(
        &mut self,
        stmt: &Statement,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        match stmt {
            Statement::Include(path) => {
                debug!("include \"{path}\": standard gates are built in");
                Ok(())
            }

            Statement::QubitDecl { name, size } => {
                self.check_new_name(name)?;
                let ids = self.circuit.add_qreg(name.clone(), *size)?;
                let start = ids.first().map_or(self.circuit.num_qubits() as u32, |q| q.0);
                self.qregs
                    .insert(name.clone(), Register::new(name.clone(), start, *size));
                Ok(())
            }

            Statement::BitDecl { name, size } => {
                self.check_new_name(name)?;
                let ids = self.circuit.add_creg(name.clone(), *size)?;
                let start = ids.first().map_or(self.circuit.num_clbits() as u32, |c| c.0);
                self.cregs
                    .insert(name.clone(), Register::new(name.clone(), start, *size));
                Ok(())
            }

            Statement::Gate(call) => self.lower_gate_call(call, condition),

            Statement::Measure { qubits, bits } => {
                if condition.is_some() {
                    return Err(ParseError::Unsupported(
                        "conditional measurement".into(),
                    ));
                }
                let q_ids: Vec<QubitId> = self.resolve_qubits(qubits)?.into_iter().flatten().collect();
                let c_ids = self.resolve_clbits(bits)?;
                if q_ids.len() != c_ids.len() {
                    return Err(ParseError::RegisterSizeMismatch {
                        operation: "measure".into(),
                        first: q_ids.len(),
                        second: c_ids.len(),
                    });
                }
                for (q, c) in q_ids.into_iter().zip(c_ids) {
                    self.circuit.measure(q, c)?;
                }
                Ok(())
            }

            Statement::Reset { qubits } => {
                if condition.is_some() {
                    return Err(ParseError::Unsupported("conditional reset".into()));
                }
                for q in self.resolve_qubits(qubits)?.into_iter().flatten() {
                    self.circuit.reset(q)?;
                }
                Ok(())
            }

            Statement::Barrier { qubits } => {
                if qubits.is_empty() {
                    self.circuit.barrier_all()?;
                } else {
                    let ids: Vec<QubitId> =
                        self.resolve_qubits(qubits)?.into_iter().flatten().collect();
                    self.circuit.barrier(ids)?;
                }
                Ok(())
            }

            Statement::If {
                condition: cond,
                body,
            } => {
                if condition.is_some() {
                    return Err(ParseError::Unsupported("nested if statements".into()));
                }
                if let Some(index) = cond.index {
                    return Err(ParseError::Unsupported(format!(
                        "condition on single bit {}[{index}]",
                        cond.register
                    )));
                }
                if !self.cregs.contains_key(&cond.register) {
                    return Err(ParseError::UndefinedIdentifier(cond.register.clone()));
                }
                let guard = ClassicalCondition::new(cond.register.clone(), cond.value);
                for stmt in body {
                    self.lower_statement(stmt, Some(&guard))?;
                }
                Ok(())
            }

            Statement::GateDef(def) => {
                if self.gates.contains_key(&def.name) || self.opaque.contains(&def.name) {
                    return Err(ParseError::DuplicateDeclaration(def.name.clone()));
                }
                self.gates.insert(def.name.clone(), def.clone());
                Ok(())
            }

            Statement::Opaque { name, .. } => {
                if self.gates.contains_key(name) || !self.opaque.insert(name.clone()) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                Ok(())
            }
        }
    }

    fn check_new_name(&self, name: &str) -> ParseResult<()> {
        if self.qregs.contains_key(name) || self.cregs.contains_key(name) {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        Ok(())
    }

    fn lower_gate_call(
        &mut self,
        call: &GateCall,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        let env = FxHashMap::default();
        let params = call
            .params
            .iter()
            .map(|p| p.eval(&env))
            .collect::<ParseResult<Vec<f64>>>()?;

        for operands in self.broadcast(&call.name, &call.qubits)? {
            self.apply_gate(&call.name, &params, &operands, condition, 0)?;
        }
        Ok(())
    }

    /// Apply one gate to concrete qubits, inlining user definitions.
    fn apply_gate(
        &mut self,
        name: &str,
        params: &[f64],
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
        depth: usize,
    ) -> ParseResult<()> {
        if depth > MAX_INLINE_DEPTH {
            return Err(ParseError::Unsupported(format!(
                "gate '{name}' is defined recursively"
            )));
        }

        if let Some(def) = self.gates.get(name).cloned() {
            check_param_count(name, params.len(), def.params.len())?;
            check_qubit_count(name, qubits.len(), def.qubits.len())?;

            let env: FxHashMap<String, f64> = def
                .params
                .iter()
                .cloned()
                .zip(params.iter().copied())
                .collect();
            let args: FxHashMap<&str, QubitId> = def
                .qubits
                .iter()
                .map(String::as_str)
                .zip(qubits.iter().copied())
                .collect();

            for stmt in &def.body {
                match stmt {
                    Statement::Gate(inner) => {
                        let inner_params = inner
                            .params
                            .iter()
                            .map(|p| p.eval(&env))
                            .collect::<ParseResult<Vec<f64>>>()?;
                        let inner_qubits = map_gate_args(name, &inner.qubits, &args)?;
                        self.apply_gate(&inner.name, &inner_params, &inner_qubits, condition, depth + 1)?;
                    }
                    Statement::Barrier { qubits: refs } => {
                        let ids = if refs.is_empty() {
                            qubits.to_vec()
                        } else {
                            map_gate_args(name, refs, &args)?
                        };
                        self.circuit.barrier(ids)?;
                    }
                    _ => {}
                }
            }
            return Ok(());
        }

        if self.opaque.contains(name) {
            return Err(ParseError::OpaqueGate(name.to_string()));
        }

        for (gate, operands) in expand_builtin(name, params, qubits.len())? {
            let mut g = Gate::standard(gate);
            if let Some(cond) = condition {
                g = g.with_condition(cond.clone());
            }
            self.circuit
                .apply(Instruction::gate(g, operands.iter().map(|&i| qubits[i])))?;
        }
        Ok(())
    }

    /// Expand register arguments: `h q;` applies to every element and
    /// `cx a, b;` pairs elements of equally sized registers.
    fn broadcast(&self, operation: &str, refs: &[QubitRef]) -> ParseResult<Vec<Vec<QubitId>>> {
        let resolved = self.resolve_qubits(refs)?;

        let mut width: Option<usize> = None;
        for (ids, r) in resolved.iter().zip(refs) {
            if r.index.is_some() {
                continue;
            }
            match width {
                None => width = Some(ids.len()),
                Some(w) if w != ids.len() => {
                    return Err(ParseError::RegisterSizeMismatch {
                        operation: operation.to_string(),
                        first: w,
                        second: ids.len(),
                    });
                }
                Some(_) => {}
            }
        }

        let n = width.unwrap_or(1);
        Ok((0..n)
            .map(|i| {
                resolved
                    .iter()
                    .zip(refs)
                    .map(|(ids, r)| if r.index.is_none() { ids[i] } else { ids[0] })
                    .collect()
            })
            .collect())
    }

    fn resolve_qubits(&self, refs: &[QubitRef]) -> ParseResult<Vec<Vec<QubitId>>> {
        refs.iter()
            .map(|r| {
                let reg = self
                    .qregs
                    .get(&r.register)
                    .ok_or_else(|| ParseError::UndefinedIdentifier(r.register.clone()))?;
                Ok(resolve_in(reg, r.index)?.into_iter().map(QubitId).collect())
            })
            .collect()
    }

    fn resolve_clbits(&self, refs: &[BitRef]) -> ParseResult<Vec<ClbitId>> {
        let mut ids = Vec::new();
        for r in refs {
            let reg = self
                .cregs
                .get(&r.register)
                .ok_or_else(|| ParseError::UndefinedIdentifier(r.register.clone()))?;
            ids.extend(resolve_in(reg, r.index)?.into_iter().map(ClbitId));
        }
        Ok(ids)
    }
}

/// Flat indices addressed by `reg` or `reg[index]`.
fn resolve_in(reg: &Register, index: Option<u32>) -> ParseResult<Vec<u32>> {
    match index {
        None => Ok(reg.indices().collect()),
        Some(i) => reg
            .flat(i)
            .map(|flat| vec![flat])
            .ok_or_else(|| ParseError::IndexOutOfBounds {
                register: reg.name.clone(),
                index: i as usize,
                size: reg.size as usize,
            }),
    }
}

/// Map the formal qubit names used inside a gate body to call-site qubits.
fn map_gate_args(
    gate: &str,
    refs: &[QubitRef],
    args: &FxHashMap<&str, QubitId>,
) -> ParseResult<Vec<QubitId>> {
    refs.iter()
        .map(|r| {
            if r.index.is_some() {
                return Err(ParseError::Unsupported(format!(
                    "indexed qubit argument {}[..] in body of '{gate}'",
                    r.register
                )));
            }
            args.get(r.register.as_str())
                .copied()
                .ok_or_else(|| ParseError::UndefinedIdentifier(r.register.clone()))
        })
        .collect()
}

/// (parameter count, qubit count) of a built-in gate.
fn builtin_signature(name: &str) -> Option<(usize, usize)> {
    Some(match name {
        "id" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "sx" | "sxdg" => (0, 1),
        "u0" | "rx" | "ry" | "rz" | "p" | "phase" | "u1" => (1, 1),
        "u2" => (2, 1),
        "U" | "u" | "u3" => (3, 1),
        "CX" | "cx" | "cnot" | "cy" | "cz" | "ch" | "swap" => (0, 2),
        "crx" | "cry" | "crz" | "cp" | "cphase" | "cu1" | "rxx" | "rzz" => (1, 2),
        "cu3" => (3, 2),
        "cu" => (4, 2),
        "ccx" | "toffoli" | "cswap" | "fredkin" => (0, 3),
        _ => return None,
    })
}

/// Expand a built-in gate into standard gates over operand positions.
fn expand_builtin(
    name: &str,
    p: &[f64],
    num_qubits: usize,
) -> ParseResult<Vec<(StandardGate, Vec<usize>)>> {
    let (num_params, arity) =
        builtin_signature(name).ok_or_else(|| ParseError::UnknownGate(name.to_string()))?;
    check_param_count(name, p.len(), num_params)?;
    check_qubit_count(name, num_qubits, arity)?;

    let one = |g: StandardGate| vec![(g, vec![0])];
    let two = |g: StandardGate| vec![(g, vec![0, 1])];

    Ok(match name {
        "id" | "u0" => one(StandardGate::I),
        "x" => one(StandardGate::X),
        "y" => one(StandardGate::Y),
        "z" => one(StandardGate::Z),
        "h" => one(StandardGate::H),
        "s" => one(StandardGate::S),
        "sdg" => one(StandardGate::Sdg),
        "t" => one(StandardGate::T),
        "tdg" => one(StandardGate::Tdg),
        "sx" => one(StandardGate::SX),
        "sxdg" => one(StandardGate::SXdg),
        "rx" => one(StandardGate::Rx(p[0])),
        "ry" => one(StandardGate::Ry(p[0])),
        "rz" => one(StandardGate::Rz(p[0])),
        "p" | "phase" | "u1" => one(StandardGate::P(p[0])),
        "u2" => one(StandardGate::U(PI / 2.0, p[0], p[1])),
        "U" | "u" | "u3" => one(StandardGate::U(p[0], p[1], p[2])),
        "CX" | "cx" | "cnot" => two(StandardGate::CX),
        "cy" => two(StandardGate::CY),
        "cz" => two(StandardGate::CZ),
        "ch" => two(StandardGate::CH),
        "swap" => two(StandardGate::Swap),
        "crx" => two(StandardGate::CRx(p[0])),
        "cry" => two(StandardGate::CRy(p[0])),
        "crz" => two(StandardGate::CRz(p[0])),
        "cp" | "cphase" | "cu1" => two(StandardGate::CP(p[0])),
        "rxx" => two(StandardGate::RXX(p[0])),
        "rzz" => two(StandardGate::RZZ(p[0])),
        "cu3" => controlled_u(p[0], p[1], p[2]),
        "cu" => {
            let mut gates = vec![(StandardGate::P(p[3]), vec![0])];
            gates.extend(controlled_u(p[0], p[1], p[2]));
            gates
        }
        "ccx" | "toffoli" => vec![(StandardGate::CCX, vec![0, 1, 2])],
        "cswap" | "fredkin" => vec![(StandardGate::CSwap, vec![0, 1, 2])],
        other => return Err(ParseError::UnknownGate(other.to_string())),
    })
}

/// qelib1 definition of `cu3(θ,φ,λ) c, t`.
fn controlled_u(theta: f64, phi: f64, lambda: f64) -> Vec<(StandardGate, Vec<usize>)> {
    vec![
        (StandardGate::P((lambda + phi) / 2.0), vec![0]),
        (StandardGate::P((lambda - phi) / 2.0), vec![1]),
        (StandardGate::CX, vec![0, 1]),
        (StandardGate::U(-theta / 2.0, 0.0, -(phi + lambda) / 2.0), vec![1]),
        (StandardGate::CX, vec![0, 1]),
        (StandardGate::U(theta / 2.0, phi, 0.0), vec![1]),
    ]
}

fn check_param_count(gate: &str, got: usize, expected: usize) -> ParseResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(ParseError::WrongParameterCount {
            gate: gate.into(),
            expected,
            got,
        })
    }
}

fn check_qubit_count(gate: &str, got: usize, expected: usize) -> ParseResult<()> {
    if got == expected {
        Ok(())
    } else {
        Err(ParseError::WrongQubitCount {
            gate: gate.into(),
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ParseError;
    use crate::parser::parse;
    use crate::version::QasmVersion;
    use qrelay_ir::{ClbitId, InstructionKind, QubitId, StandardGate};

    fn v2(body: &str) -> Result<qrelay_ir::Circuit, ParseError> {
        parse(&format!("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n{body}"), QasmVersion::V2)
    }

    #[test]
    fn test_register_broadcast() {
        let circuit = v2("qreg a[3]; qreg b[3]; creg c[3]; h a; cx a, b; measure b -> c;").unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts["h"], 3);
        assert_eq!(counts["cx"], 3);
        assert_eq!(counts["measure"], 3);
        let cx: Vec<_> = circuit.instructions().iter().filter(|i| i.name() == "cx").collect();
        assert_eq!(cx[2].qubits, vec![QubitId(2), QubitId(5)]);
    }

    #[test]
    fn test_single_qubit_broadcast_against_register() {
        let circuit = v2("qreg a[1]; qreg b[2]; cx a[0], b;").unwrap();
        assert_eq!(circuit.instructions()[1].qubits, vec![QubitId(0), QubitId(2)]);
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        let err = v2("qreg a[2]; qreg b[3]; cx a, b;").unwrap_err();
        assert!(matches!(err, ParseError::RegisterSizeMismatch { first: 2, second: 3, .. }));
    }

    #[test]
    fn test_gate_definition_is_inlined() {
        let circuit = v2(
            "gate bell(theta) a, b { h a; cx a, b; rz(theta/2) b; }\n\
             qreg q[2]; bell(pi) q[1], q[0];",
        )
        .unwrap();
        let insts = circuit.instructions();
        assert_eq!(insts.len(), 3);
        assert_eq!(insts[0].qubits, vec![QubitId(1)]);
        assert_eq!(insts[1].qubits, vec![QubitId(1), QubitId(0)]);
        match &insts[2].kind {
            InstructionKind::Gate(g) => {
                assert!(matches!(g.kind, StandardGate::Rz(a) if (a - std::f64::consts::FRAC_PI_2).abs() < 1e-12));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_gate_definitions() {
        let circuit = v2(
            "gate inner a { x a; }\ngate outer a, b { inner a; inner b; }\nqreg q[2]; outer q[0], q[1];",
        )
        .unwrap();
        assert_eq!(circuit.count_ops()["x"], 2);
    }

    #[test]
    fn test_opaque_gate_rejected_on_use() {
        assert!(v2("opaque magic a; qreg q[1];").is_ok());
        let err = v2("opaque magic a; qreg q[1]; magic q[0];").unwrap_err();
        assert!(matches!(err, ParseError::OpaqueGate(ref n) if n == "magic"));
    }

    #[test]
    fn test_qasm2_conditional() {
        let circuit = v2("qreg q[1]; creg c[2]; measure q[0] -> c[0]; if (c == 1) x q[0];").unwrap();
        let cond = circuit.instructions()[1].condition().unwrap();
        assert_eq!(cond.register, "c");
        assert_eq!(cond.value, 1);
    }

    #[test]
    fn test_qasm3_conditional_block() {
        let source = "OPENQASM 3.0;\nqubit[2] q;\nbit[1] c;\nc[0] = measure q[0];\nif (c == 1) { x q[1]; h q[0]; }";
        let circuit = parse(source, QasmVersion::V3).unwrap();
        assert_eq!(
            circuit.instructions().iter().filter(|i| i.condition().is_some()).count(),
            2
        );
        assert_eq!(circuit.instructions()[0].clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_conditional_measure_rejected() {
        let err = v2("qreg q[1]; creg c[1]; if (c == 0) measure q[0] -> c[0];").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported(_)));
    }

    #[test]
    fn test_macro_gates() {
        let circuit = v2("qreg q[2]; u2(0, pi) q[0]; cu3(pi, 0, 0) q[0], q[1]; cu1(pi) q[0], q[1];").unwrap();
        assert_eq!(circuit.num_ops(), 1 + 6 + 1);
    }

    #[test]
    fn test_parameter_and_qubit_count_errors() {
        assert!(matches!(
            v2("qreg q[1]; rx q[0];").unwrap_err(),
            ParseError::WrongParameterCount { expected: 1, got: 0, .. }
        ));
        assert!(matches!(
            v2("qreg q[2]; h q[0], q[1];").unwrap_err(),
            ParseError::WrongQubitCount { expected: 1, got: 2, .. }
        ));
        assert!(matches!(
            v2("qreg q[1]; frobnicate q[0];").unwrap_err(),
            ParseError::UnknownGate(_)
        ));
    }

    #[test]
    fn test_index_out_of_bounds_and_duplicates() {
        assert!(matches!(
            v2("qreg q[2]; x q[2];").unwrap_err(),
            ParseError::IndexOutOfBounds { index: 2, size: 2, .. }
        ));
        assert!(matches!(
            v2("qreg q[2]; creg q[2];").unwrap_err(),
            ParseError::DuplicateDeclaration(_)
        ));
    }

    #[test]
    fn test_barrier_and_reset() {
        let circuit = v2("qreg q[3]; barrier q[0], q[2]; reset q; barrier;").unwrap();
        let insts = circuit.instructions();
        assert_eq!(insts[0].qubits.len(), 2);
        assert_eq!(circuit.count_ops()["reset"], 3);
        assert_eq!(insts.last().unwrap().qubits.len(), 3);
    }
}
