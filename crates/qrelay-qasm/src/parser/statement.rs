//! Statement parsing.

use super::Parser;
use crate::ast::{BitRef, Condition, GateCall, GateDef, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;
use crate::version::QasmVersion;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let v3 = self.dialect == QasmVersion::V3;
        match token {
            Token::Include => self.parse_include(),
            Token::Qreg => self.parse_legacy_decl(true),
            Token::Creg => self.parse_legacy_decl(false),
            Token::Qubit if v3 => self.parse_decl(true),
            Token::Bit if v3 => self.parse_decl(false),
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::If => self.parse_if(),
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque(),
            Token::GateU => {
                self.advance();
                self.parse_gate_call("U".into())
            }
            Token::GateCX => {
                self.advance();
                self.parse_gate_call("CX".into())
            }
            Token::Identifier(_) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("statement", &token)),
        }
    }

    /// Parse include statement. Standard libraries are built in, so the
    /// path is only recorded.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let line = self.line();
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "string literal".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `qreg name[n];` or `creg name[n];`.
    fn parse_legacy_decl(&mut self, quantum: bool) -> ParseResult<Statement> {
        self.advance();
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// Parse `qubit[n] name;`, `bit name;` and friends.
    fn parse_decl(&mut self, quantum: bool) -> ParseResult<Statement> {
        self.advance();
        let size = if self.consume(&Token::LBracket) {
            let size = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            size
        } else {
            1
        };
        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// Parse `measure q -> c;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Arrow)?;
        let bits = self.parse_bit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { qubits, bits })
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubits })
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse `if (c == n) op;` (both dialects) or `if (c == n) { ... }` (QASM 3).
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.parse_identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let i = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(i)
        } else {
            None
        };
        self.expect(Token::EqEq)?;
        let value = self.parse_int_literal()?;
        self.expect(Token::RParen)?;

        let body = if self.dialect == QasmVersion::V3 {
            self.parse_block_or_statement()?
        } else {
            vec![self.parse_statement()?]
        };

        Ok(Statement::If {
            condition: Condition {
                register,
                index,
                value,
            },
            body,
        })
    }

    /// Parse the optional `(a, b)` parameter list and qubit argument names
    /// shared by `gate` and `opaque`.
    fn parse_gate_signature(&mut self) -> ParseResult<(String, Vec<String>, Vec<String>)> {
        let name = self.parse_identifier()?;
        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };
        let qubits = self.parse_identifier_list()?;
        Ok((name, params, qubits))
    }

    /// Parse gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let (name, params, qubits) = self.parse_gate_signature()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            let line = self.line();
            let stmt = self.parse_statement()?;
            if !matches!(stmt, Statement::Gate(_) | Statement::Barrier { .. }) {
                return Err(ParseError::Unsupported(format!(
                    "only gate calls and barriers are allowed in the body of '{name}' (line {line})"
                )));
            }
            body.push(stmt);
        }
        self.expect(Token::RBrace)?;

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// Parse opaque gate declaration.
    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Opaque {
            name,
            params,
            qubits,
        })
    }

    /// Parse statement starting with identifier (gate call or measure assignment).
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        if self.dialect == QasmVersion::V3 && (self.check(&Token::Eq) || self.check(&Token::LBracket)) {
            return self.parse_measure_assignment(name);
        }

        self.parse_gate_call(name)
    }

    /// Parse `c = measure q;` or `c[i] = measure q[j];`.
    fn parse_measure_assignment(&mut self, target: String) -> ParseResult<Statement> {
        let index = if self.consume(&Token::LBracket) {
            let idx = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(idx)
        } else {
            None
        };

        self.expect(Token::Eq)?;
        if !self.consume(&Token::Measure) {
            return Err(ParseError::Unsupported(format!(
                "classical assignment to '{target}' (line {})",
                self.line()
            )));
        }
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure {
            qubits,
            bits: vec![BitRef {
                register: target,
                index,
            }],
        })
    }

    /// Parse gate call.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<Statement> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    /// Parse a block or single statement.
    pub(super) fn parse_block_or_statement(&mut self) -> ParseResult<Vec<Statement>> {
        if self.consume(&Token::LBrace) {
            let mut stmts = Vec::new();
            while !self.check(&Token::RBrace) {
                if self.is_eof() {
                    return Err(ParseError::UnexpectedEof("expected }".into()));
                }
                stmts.push(self.parse_statement()?);
            }
            self.expect(Token::RBrace)?;
            Ok(stmts)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse qubit references.
    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single qubit reference.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let (register, index) = self.parse_indexed_name()?;
        Ok(QubitRef { register, index })
    }

    /// Parse bit references.
    fn parse_bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = vec![self.parse_bit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_bit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single bit reference.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let (register, index) = self.parse_indexed_name()?;
        Ok(BitRef { register, index })
    }

    fn parse_indexed_name(&mut self) -> ParseResult<(String, Option<u32>)> {
        let register = self.parse_identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok((register, index))
    }
}
