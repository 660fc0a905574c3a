//! Tokenizer for expression text

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Unsigned magnitude; a leading `-` is a separate token
    Integer(u64),
    Float(f64),
    Str(String),
    /// Bare identifier, may be a keyword
    Ident(String),
    /// Back-quoted identifier, never a keyword
    QuotedIdent(String),
    /// Operator symbol, normalized (`&` becomes `and`, `=` is rejected)
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Dot,
    Eof,
}

pub(crate) struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub(crate) fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::ExprParse {
            offset: self.position,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Read text up to the closing `quote`; a doubled quote is an escaped quote.
    fn read_quoted(&mut self, quote: char) -> CoreResult<String> {
        let start = self.position;
        let mut result = String::new();
        self.advance();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                if self.current_char() == Some(quote) {
                    result.push(quote);
                    self.advance();
                } else {
                    return Ok(result);
                }
            } else {
                result.push(ch);
            }
        }
        Err(CoreError::ExprParse {
            offset: start,
            message: format!("unterminated {quote}-quoted text"),
        })
    }

    fn read_number(&mut self) -> CoreResult<Token> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && (self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.peek_char(1), Some('+') | Some('-'))
                        && self.peek_char(2).is_some_and(|c| c.is_ascii_digit())))
            {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let parsed = if is_float {
            number.parse::<f64>().map(Token::Float).ok()
        } else {
            // integers too large for u64 fall back to float
            number
                .parse::<u64>()
                .map(Token::Integer)
                .ok()
                .or_else(|| number.parse::<f64>().map(Token::Float).ok())
        };
        parsed.ok_or_else(|| CoreError::ExprParse {
            offset: start,
            message: format!("invalid number '{number}'"),
        })
    }

    /// Tokenize the whole input, recording each token's start offset
    pub(crate) fn tokenize(mut self) -> CoreResult<Vec<(Token, usize)>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let offset = self.position;
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, offset));
            if done {
                return Ok(tokens);
            }
        }
    }

    fn symbol(&mut self, width: usize, op: &'static str) -> Token {
        self.position += width;
        Token::Op(op)
    }

    fn next_token(&mut self) -> CoreResult<Token> {
        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let next = self.peek_char(1);
        let token = match ch {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '.' if !next.is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                Token::Dot
            }
            '\'' | '"' => Token::Str(self.read_quoted(ch)?),
            '`' => Token::QuotedIdent(self.read_quoted('`')?),
            '+' => self.symbol(1, "+"),
            '-' => self.symbol(1, "-"),
            '*' => self.symbol(1, "*"),
            '/' => self.symbol(1, "/"),
            '%' => self.symbol(1, "%"),
            '=' if next == Some('=') => self.symbol(2, "=="),
            '!' if next == Some('=') => self.symbol(2, "!="),
            '!' => self.symbol(1, "not"),
            '<' if next == Some('=') => self.symbol(2, "<="),
            '<' if next == Some('>') => self.symbol(2, "!="),
            '<' => self.symbol(1, "<"),
            '>' if next == Some('=') => self.symbol(2, ">="),
            '>' => self.symbol(1, ">"),
            '&' if next == Some('&') => self.symbol(2, "and"),
            '&' => self.symbol(1, "and"),
            '|' if next == Some('|') => self.symbol(2, "or"),
            '|' => self.symbol(1, "or"),
            '=' => return Err(self.error("single '=' is not an operator, use '=='")),
            c if c.is_ascii_digit() || c == '.' => self.read_number()?,
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_identifier()),
            other => return Err(self.error(format!("unexpected character '{other}'"))),
        };
        Ok(token)
    }
}
