//! Angle expression parsing.

use super::Parser;
use crate::ast::{BinOp, Expression};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();

            // Exponentiation is right-associative.
            let next = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary_expr(next)?;
            left = Expression::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(Expression::Neg(Box::new(expr)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;

        match token {
            Token::IntLiteral(v) => Ok(Expression::Int(v)),
            Token::FloatLiteral(v) => Ok(Expression::Float(v)),
            Token::Pi => Ok(Expression::Pi),
            Token::Tau => Ok(Expression::Tau),
            Token::Euler => Ok(Expression::Euler),
            Token::Identifier(name) => {
                if self.consume(&Token::LParen) {
                    let args = self.parse_expression_list()?;
                    self.expect(Token::RParen)?;
                    Ok(Expression::FnCall { name, args })
                } else {
                    Ok(Expression::Identifier(name))
                }
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => {
                self.pos -= 1;
                Err(self.unexpected("expression", &other))
            }
        }
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Power | Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }

    /// Parse expression list.
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Statement;
    use crate::parser::parse_ast;
    use crate::version::QasmVersion;
    use std::f64::consts::PI;

    fn first_param(expr: &str) -> f64 {
        let source = format!("OPENQASM 2.0; qreg q[1]; rz({expr}) q[0];");
        let program = parse_ast(&source, QasmVersion::V2).unwrap();
        match &program.statements[1] {
            Statement::Gate(call) => call.params[0].as_f64().unwrap(),
            other => panic!("expected gate call, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        assert!((first_param("1 + 2 * 3") - 7.0).abs() < 1e-12);
        assert!((first_param("(1 + 2) * 3") - 9.0).abs() < 1e-12);
        assert!((first_param("-pi/2") + PI / 2.0).abs() < 1e-12);
        assert!((first_param("2 ** 3 ** 2") - 512.0).abs() < 1e-9);
        assert!((first_param("2^2") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((first_param("cos(pi)") + 1.0).abs() < 1e-12);
        assert!((first_param("sqrt(4) + ln(1)") - 2.0).abs() < 1e-12);
        assert!((first_param("tau / 2") - PI).abs() < 1e-12);
        assert!((first_param("1.5e-1") - 0.15).abs() < 1e-12);
    }
}
