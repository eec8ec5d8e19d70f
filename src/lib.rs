//! RustDB - An in-memory relational database engine written in Rust
//!
//! This library provides the components behind the shell and the server:
//! - SQL parsing (lexer, parser, AST)
//! - Typed tables with UNIQUE constraints and identity counters
//! - Statement execution, including a nested-loop join
//! - JSON snapshot persistence
//! - A coordinator serializing access from the shell and HTTP clients

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod server;
pub mod shell;
pub mod sql;
pub mod storage;

pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use executor::QueryResult;
