//! Error types for RustDB
//!
//! Every error is caller-facing: the shell and the HTTP endpoint render the
//! `Display` text after an `Error: ` prefix.

use thiserror::Error;

/// The main error type for RustDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Syntax error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Syntax error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Syntax error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Syntax error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Syntax error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Syntax error: expression nested more than {0} levels deep")]
    NestingTooDeep(usize),

    // ========== Catalog Errors ==========
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Column '{0}' is declared more than once in table '{1}'")]
    DuplicateColumn(String, String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    // ========== Constraint Errors ==========
    #[error("Table '{table}' expects {expected} values, got {found}")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Type mismatch on column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("UNIQUE constraint violated on column '{0}'")]
    UniqueViolation(String),

    #[error("Row with id {id} not found in table '{table}'")]
    RowNotFound { table: String, id: u64 },

    // ========== Execution Errors ==========
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    // ========== Server Errors ==========
    #[error("Server error: {0}")]
    Server(String),

    // ========== Persistence Errors ==========
    #[error("Persistence error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persistence error: malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Persistence error: corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl Error {
    /// Whether this error comes from the lexer or parser
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedCharacter(..)
                | Error::UnterminatedString(_)
                | Error::InvalidNumber(_)
                | Error::UnexpectedToken { .. }
                | Error::UnexpectedEof(_)
                | Error::NestingTooDeep(_)
        )
    }

    /// Whether this error comes from reading or writing the snapshot file
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Snapshot(_) | Error::CorruptSnapshot(_)
        )
    }
}

/// Result type alias for RustDB operations
pub type Result<T> = std::result::Result<T, Error>;
