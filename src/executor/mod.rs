//! Query execution module
//!
//! This module contains the statement executor and its result type.

pub mod executor;

pub use executor::{ExecutionEngine, QueryResult};
