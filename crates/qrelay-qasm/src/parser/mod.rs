//! Recursive-descent parser for `OpenQASM` 2 and 3.

mod expression;
mod lowering;
mod statement;

pub(crate) use lowering::lower_to_circuit;

use qrelay_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};
use crate::version::QasmVersion;

/// Parse a QASM source string in the given dialect into a Circuit.
pub fn parse(source: &str, version: QasmVersion) -> ParseResult<Circuit> {
    let program = parse_ast(source, version)?;
    lower_to_circuit(&program)
}

/// Parse a QASM source string into an AST Program.
pub fn parse_ast(source: &str, version: QasmVersion) -> ParseResult<Program> {
    let mut parser = Parser::new(source, version)?;
    parser.parse_program()
}

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    pub(super) dialect: QasmVersion,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str, dialect: QasmVersion) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            dialect,
        })
    }

    /// Line of the current token (or the last one at end of input).
    pub(super) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Build an `UnexpectedToken` error for the current position.
    pub(super) fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(Token::OpenQasm)?;
        let version = self.parse_version()?;
        if !self.dialect.matches_header(&version) {
            return Err(ParseError::VersionMismatch {
                requested: self.dialect.to_string(),
                found: version,
            });
        }
        self.expect(Token::Semicolon)?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse version number.
    fn parse_version(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) => Ok(format!("{v:?}")),
            Some(Token::IntLiteral(v)) => Ok(v.to_string()),
            Some(other) => Err(ParseError::InvalidVersion(other.to_string())),
            None => Err(ParseError::UnexpectedEof("version number".into())),
        }
    }

    /// Parse identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }

    /// Parse a non-negative integer that must fit a register index or size.
    pub(super) fn parse_u32(&mut self) -> ParseResult<u32> {
        let line = self.line();
        let value = self.parse_int_literal()?;
        u32::try_from(value).map_err(|_| ParseError::UnexpectedToken {
            line,
            expected: "register index or size".into(),
            found: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bell_qasm2() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;

        let circuit = parse(source, QasmVersion::V2).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.num_ops(), 4);
    }

    #[test]
    fn test_parse_bell_qasm3() {
        let source = r#"
            OPENQASM 3.0;
            include "stdgates.inc";
            bit[2] c;
            qubit[2] q;
            h q[0];
            cx q[0], q[1];
            c[0] = measure q[0];
            c[1] = measure q[1];
        "#;

        let circuit = parse(source, QasmVersion::V3).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_version_mismatch() {
        let source = "OPENQASM 3.0; qubit[1] q;";
        let err = parse(source, QasmVersion::V2).unwrap_err();
        assert!(matches!(err, ParseError::VersionMismatch { ref requested, ref found }
            if requested == "2" && found == "3.0"));

        assert!(parse("OPENQASM 3; qubit q;", QasmVersion::V3).is_ok());
    }

    #[test]
    fn test_qasm3_declarations_rejected_in_qasm2() {
        let source = "OPENQASM 2.0; qubit[2] q;";
        let err = parse(source, QasmVersion::V2).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 1, .. }));
    }

    #[test]
    fn test_missing_header() {
        let err = parse("qreg q[1];", QasmVersion::V2).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_error_undefined() {
        let source = "OPENQASM 2.0;\nh undefined[0];";
        let err = parse(source, QasmVersion::V2).unwrap_err();
        assert!(matches!(err, ParseError::UndefinedIdentifier(ref name) if name == "undefined"));
    }
}
