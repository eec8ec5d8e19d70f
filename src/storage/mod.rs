//! Storage module
//!
//! This module contains the in-memory storage components:
//! - Values
//! - Tables and rows
//! - The database (set of tables)
//! - Snapshot persistence

pub mod database;
pub mod snapshot;
pub mod table;
pub mod value;

pub use database::Database;
pub use table::{Row, Table};
pub use value::Value;
