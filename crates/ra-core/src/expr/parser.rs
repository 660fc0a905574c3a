//! Recursive-descent parser for expression text
//!
//! Precedence, loosest first: `or`, `and`, prefix `not`, comparisons,
//! `+ -`, `* / %`, prefix `-`, then calls and `.method(...)` postfix.

use super::context::ExprContext;
use super::lexer::{Lexer, Token};
use super::{call, Expression};
use crate::error::{CoreError, CoreResult};
use crate::value::Value;

/// Parse `source` into an expression.
///
/// Bare identifiers resolve to a column in `columns` first, then to a named
/// value in `ctx` (inlined as a constant). Anything else is an error, so an
/// expression that parses only references columns that exist.
pub fn parse_expression(
    source: &str,
    columns: &[String],
    ctx: &ExprContext,
) -> CoreResult<Expression> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        tokens,
        position: 0,
        columns,
        ctx,
    };
    let expr = parser.parse_or()?;
    match parser.current() {
        Token::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected trailing {other:?}"))),
    }
}

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    position: usize,
    columns: &'a [String],
    ctx: &'a ExprContext,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        // tokenize always ends with Eof
        &self.tokens[self.position.min(self.tokens.len() - 1)].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.position.min(self.tokens.len() - 1)].1
    }

    fn peek(&self) -> &Token {
        &self.tokens[(self.position + 1).min(self.tokens.len() - 1)].0
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::ExprParse {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token) -> CoreResult<()> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current()
            )))
        }
    }

    fn check_op(&self, ops: &[&'static str]) -> Option<&'static str> {
        match self.current() {
            Token::Op(op) if ops.contains(op) => Some(*op),
            Token::Ident(word) if ops.contains(&word.as_str()) => {
                ops.iter().copied().find(|op| *op == word.as_str())
            }
            _ => None,
        }
    }

    fn parse_or(&mut self) -> CoreResult<Expression> {
        let mut left = self.parse_and()?;
        while let Some(op) = self.check_op(&["or"]) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::infix(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> CoreResult<Expression> {
        let mut left = self.parse_not()?;
        while let Some(op) = self.check_op(&["and"]) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::infix(op, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> CoreResult<Expression> {
        if self.check_op(&["not"]).is_some() {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(call("not", vec![operand]));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> CoreResult<Expression> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.check_op(&["==", "!=", "<", "<=", ">", ">="]) {
            self.advance();
            let right = self.parse_additive()?;
            left = Expression::infix(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> CoreResult<Expression> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.check_op(&["+", "-"]) {
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::infix(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> CoreResult<Expression> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.check_op(&["*", "/", "%"]) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::infix(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> CoreResult<Expression> {
        if self.check_op(&["-"]).is_some() {
            self.advance();
            // i64::MIN has no positive counterpart to negate
            if *self.current() == Token::Integer(i64::MIN.unsigned_abs())
                && *self.peek() != Token::Dot
            {
                self.advance();
                return Ok(Expression::Constant(Value::Int(i64::MIN)));
            }
            let operand = self.parse_unary()?;
            return Ok(-operand);
        }
        if self.check_op(&["+"]).is_some() {
            self.advance();
            return self.parse_unary();
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> CoreResult<Expression> {
        let mut expr = self.parse_primary()?;
        while *self.current() == Token::Dot {
            self.advance();
            let name = match self.current().clone() {
                Token::Ident(name) => name,
                other => return Err(self.error(format!("expected method name, found {other:?}"))),
            };
            self.advance();
            let mut args = vec![expr];
            args.extend(self.parse_call_args()?);
            expr = call(name, args);
        }
        Ok(expr)
    }

    /// Parse `( a, b, ... )`, current token must be `(`
    fn parse_call_args(&mut self) -> CoreResult<Vec<Expression>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if *self.current() == Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                other => {
                    return Err(self.error(format!("expected ',' or ')', found {other:?}")))
                }
            }
        }
    }

    fn parse_primary(&mut self) -> CoreResult<Expression> {
        let token = self.current().clone();
        match token {
            Token::Integer(magnitude) => {
                self.advance();
                let value = i64::try_from(magnitude)
                    .map_or(Value::Float(magnitude as f64), Value::Int);
                Ok(Expression::Constant(value))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expression::Constant(Value::Float(f)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expression::Constant(Value::Str(s)))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::QuotedIdent(name) => {
                self.advance();
                self.resolve(name)
            }
            Token::Ident(name) => {
                self.advance();
                if *self.current() == Token::LParen {
                    let args = self.parse_call_args()?;
                    return Ok(call(name, args));
                }
                match name.as_str() {
                    "true" => Ok(Expression::Constant(Value::Bool(true))),
                    "false" => Ok(Expression::Constant(Value::Bool(false))),
                    "null" | "None" => Ok(Expression::Constant(Value::Null)),
                    "nan" => Ok(Expression::Constant(Value::Float(f64::NAN))),
                    "inf" => Ok(Expression::Constant(Value::Float(f64::INFINITY))),
                    _ => self.resolve(name),
                }
            }
            other => Err(self.error(format!("unexpected {other:?}"))),
        }
    }

    fn resolve(&self, name: String) -> CoreResult<Expression> {
        if self.columns.iter().any(|c| *c == name) {
            return Ok(Expression::Column(name));
        }
        match self.ctx.get(&name) {
            Some(v) => Ok(Expression::Constant(v.clone())),
            None => Err(CoreError::UnknownName { name }),
        }
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
