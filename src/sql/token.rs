//! SQL tokens
//!
//! Keywords live in their own [`Keyword`] enum so the lexer can look a word
//! up once and the parser can match on it without string compares.

use std::fmt;

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// A reserved word, matched case-insensitively
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            /// Canonical upper-case spelling
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),*
                }
            }

            /// Look up a bare word; `None` means it is an identifier
            pub fn lookup(word: &str) -> Option<Keyword> {
                $(
                    if word.eq_ignore_ascii_case($text) {
                        return Some(Keyword::$variant);
                    }
                )*
                None
            }
        }
    };
}

keywords! {
    Create => "CREATE",
    Table => "TABLE",
    Select => "SELECT",
    Insert => "INSERT",
    Update => "UPDATE",
    Delete => "DELETE",
    Into => "INTO",
    Values => "VALUES",
    Set => "SET",
    From => "FROM",
    Where => "WHERE",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    As => "AS",
    On => "ON",
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Outer => "OUTER",
    Full => "FULL",
    Cross => "CROSS",
    // Only recognised so they can be refused by name
    Order => "ORDER",
    Group => "GROUP",
    By => "BY",
    Having => "HAVING",
    Limit => "LIMIT",
    Offset => "OFFSET",
    Distinct => "DISTINCT",
    Unique => "UNIQUE",
    Null => "NULL",
    Is => "IS",
    Int => "INT",
    Integer => "INTEGER",
    BigInt => "BIGINT",
    Float => "FLOAT",
    Double => "DOUBLE",
    Real => "REAL",
    Text => "TEXT",
    Varchar => "VARCHAR",
    Bool => "BOOL",
    Boolean => "BOOLEAN",
    True => "TRUE",
    False => "FALSE",
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lexical unit of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    /// Bare or double-quoted name
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    /// Single-quoted string, escapes already resolved
    StringLiteral(String),
    Eq,
    /// `<>` or `!=`
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Minus,
    Asterisk,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Eof,
}

impl From<Keyword> for Token {
    fn from(keyword: Keyword) -> Self {
        Token::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Keyword(k) => k.as_str(),
            Token::Identifier(name) => return f.write_str(name),
            Token::IntegerLiteral(n) => return write!(f, "{}", n),
            Token::FloatLiteral(n) => return write!(f, "{:?}", n),
            Token::StringLiteral(s) => return write!(f, "'{}'", s.replace('\'', "''")),
            Token::Eq => "=",
            Token::Neq => "<>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Dot => ".",
            Token::Eof => "end of input",
        };
        f.write_str(symbol)
    }
}
