//! Abstract syntax tree for `OpenQASM` 2 and 3 programs.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// A complete QASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Version from the `OPENQASM` header (e.g., "2.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

/// A statement in a QASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement.
    Include(String),

    /// Quantum register: `qreg q[n];` or `qubit[n] q;`
    QubitDecl { name: String, size: u32 },

    /// Classical register: `creg c[n];` or `bit[n] c;`
    BitDecl { name: String, size: u32 },

    /// Gate application.
    Gate(GateCall),

    /// Measurement: `measure q -> c;` or `c = measure q;`
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<BitRef>,
    },

    /// Reset: `reset q;`
    Reset { qubits: Vec<QubitRef> },

    /// Barrier: `barrier q;` (empty means every qubit).
    Barrier { qubits: Vec<QubitRef> },

    /// Conditional: `if (c == n) body`.
    If {
        condition: Condition,
        body: Vec<Statement>,
    },

    /// Gate definition.
    GateDef(GateDef),

    /// Opaque gate declaration; has no body and cannot be simulated.
    Opaque {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
    },
}

/// A gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

/// A user gate definition, inlined at every call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    /// Body operations; only gate calls and barriers are allowed.
    pub body: Vec<Statement>,
}

/// `register == value` or `register[index] == value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub register: String,
    pub index: Option<u32>,
    pub value: u64,
}

/// Reference to a qubit register or one of its elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    /// `None` addresses the whole register.
    pub index: Option<u32>,
}

impl QubitRef {
    /// Create a reference to a single qubit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// Reference to a classical register or one of its bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    /// `None` addresses the whole register.
    pub index: Option<u32>,
}

impl BitRef {
    /// Create a reference to a single bit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// A classical angle expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(u64),
    /// Float literal.
    Float(f64),
    /// Identifier (a gate parameter inside a definition).
    Identifier(String),
    /// Pi constant.
    Pi,
    /// Tau constant (2π).
    Tau,
    /// Euler's number.
    Euler,
    /// Negation.
    Neg(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Function call.
    FnCall { name: String, args: Vec<Expression> },
}

impl Expression {
    /// Evaluate with the given parameter bindings.
    #[allow(clippy::cast_precision_loss)]
    pub fn eval(&self, env: &FxHashMap<String, f64>) -> ParseResult<f64> {
        Ok(match self {
            Expression::Int(v) => *v as f64,
            Expression::Float(v) => *v,
            Expression::Pi => std::f64::consts::PI,
            Expression::Tau => std::f64::consts::TAU,
            Expression::Euler => std::f64::consts::E,
            Expression::Identifier(name) => *env
                .get(name)
                .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?,
            Expression::Neg(e) => -e.eval(env)?,
            Expression::BinOp { left, op, right } => {
                let l = left.eval(env)?;
                let r = right.eval(env)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expression::FnCall { name, args } => {
                let [arg] = args.as_slice() else {
                    return Err(ParseError::InvalidExpression(format!(
                        "{name} expects 1 argument, got {}",
                        args.len()
                    )));
                };
                let x = arg.eval(env)?;
                match name.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "exp" => x.exp(),
                    "ln" => x.ln(),
                    "sqrt" => x.sqrt(),
                    other => {
                        return Err(ParseError::InvalidExpression(format!(
                            "unknown function '{other}'"
                        )));
                    }
                }
            }
        })
    }

    /// Evaluate an expression with no free identifiers.
    pub fn as_f64(&self) -> Option<f64> {
        self.eval(&FxHashMap::default()).ok()
    }
}

/// Binary operators allowed in angle expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_expression_eval() {
        let expr = Expression::BinOp {
            left: Box::new(Expression::Pi),
            op: BinOp::Div,
            right: Box::new(Expression::Int(2)),
        };
        assert!((expr.as_f64().unwrap() - PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_expression_with_bindings() {
        let expr = Expression::FnCall {
            name: "cos".into(),
            args: vec![Expression::Neg(Box::new(Expression::Identifier(
                "theta".into(),
            )))],
        };
        let mut env = FxHashMap::default();
        env.insert("theta".to_string(), PI);
        assert!((expr.eval(&env).unwrap() + 1.0).abs() < 1e-12);
        assert!(expr.as_f64().is_none());
    }

    #[test]
    fn test_unknown_function() {
        let expr = Expression::FnCall {
            name: "acosh".into(),
            args: vec![Expression::Int(1)],
        };
        assert!(matches!(
            expr.eval(&FxHashMap::default()),
            Err(ParseError::InvalidExpression(_))
        ));
    }
}
