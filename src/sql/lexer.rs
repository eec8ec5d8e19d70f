//! SQL lexer
//!
//! Walks the input by byte offset; error positions are byte offsets into
//! the statement text.

use super::token::{Keyword, Token};
use crate::error::{Error, Result};

/// Splits one statement into tokens
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Tokenize the whole input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '.' => Token::Dot,
            '*' => Token::Asterisk,
            '=' => Token::Eq,
            '<' if self.eat('=') => Token::Lte,
            '<' if self.eat('>') => Token::Neq,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::Gte,
            '>' => Token::Gt,
            '!' if self.eat('=') => Token::Neq,
            // `-5` is one literal so that i64::MIN can be written
            '-' if self.peek().map_or(false, |c| c.is_ascii_digit()) => return self.number(start),
            '-' => Token::Minus,
            '\'' => Token::StringLiteral(self.quoted('\'', start)?),
            '"' => Token::Identifier(self.quoted('"', start)?),
            c if c.is_ascii_digit() => return self.number(start),
            c if c.is_alphabetic() || c == '_' => {
                self.take_while(|c| c.is_alphanumeric() || c == '_');
                let word = &self.src[start..self.pos];
                Keyword::lookup(word)
                    .map(Token::Keyword)
                    .unwrap_or_else(|| Token::Identifier(word.to_string()))
            }
            c => return Err(Error::UnexpectedCharacter(c, start)),
        };
        Ok(token)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Skip whitespace, `-- line` and `/* block */` comments
    fn skip_trivia(&mut self) {
        loop {
            self.take_while(char::is_whitespace);
            let rest = self.rest();
            if rest.starts_with("--") {
                self.take_while(|c| c != '\n');
            } else if rest.starts_with("/*") {
                // An unclosed block comment runs to the end of input
                self.pos = match rest[2..].find("*/") {
                    Some(end) => self.pos + end + 4,
                    None => self.src.len(),
                };
            } else {
                return;
            }
        }
    }

    /// The body of a quoted string or identifier. Doubling the quote
    /// character escapes it.
    fn quoted(&mut self, quote: char, start: usize) -> Result<String> {
        let mut value = String::new();
        while let Some(ch) = self.bump() {
            if ch == quote && !self.eat(quote) {
                return Ok(value);
            }
            value.push(ch);
        }
        Err(Error::UnterminatedString(start))
    }

    /// A numeric literal whose first character (digit or `-`) is consumed.
    ///
    /// Only a fractional part or an exponent makes a float: `1200` is an
    /// integer literal, `1200.0` a float one.
    fn number(&mut self, start: usize) -> Result<Token> {
        self.take_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') && self.peek_second().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
            self.take_while(|c| c.is_ascii_digit());
            is_float = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            self.take_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        let text = &self.src[start..self.pos];
        let invalid = || Error::InvalidNumber(start);
        if is_float {
            // `1e999` parses to infinity, which no snapshot can hold
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Token::FloatLiteral)
                .ok_or_else(invalid)
        } else {
            text.parse::<i64>().map(Token::IntegerLiteral).map_err(|_| invalid())
        }
    }
}
