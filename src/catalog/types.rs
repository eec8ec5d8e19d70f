//! Data types for RustDB
//!
//! This module defines the column types a table can declare and the rule
//! deciding whether a runtime value fits a declared type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::Value;

/// SQL Data Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// UTF-8 text
    Text,
    /// Boolean
    Bool,
}

impl DataType {
    /// Check whether `value` may be stored in a column of this type.
    ///
    /// NULL fits every type. There is no coercion: an integer literal is not
    /// accepted by a FLOAT column, the caller must write `1200.0`.
    pub fn check(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DataType::Integer, Value::Integer(_)) => true,
            (DataType::Float, Value::Float(_)) => true,
            (DataType::Text, Value::Text(_)) => true,
            (DataType::Bool, Value::Bool(_)) => true,
            (DataType::Integer, _)
            | (DataType::Float, _)
            | (DataType::Text, _)
            | (DataType::Bool, _) => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Bool => write!(f, "BOOL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_matching_variants() {
        assert!(DataType::Integer.check(&Value::Integer(7)));
        assert!(DataType::Float.check(&Value::Float(1200.0)));
        assert!(DataType::Text.check(&Value::Text("a".to_string())));
        assert!(DataType::Bool.check(&Value::Bool(false)));
    }

    #[test]
    fn test_check_null_fits_everything() {
        for ty in [
            DataType::Integer,
            DataType::Float,
            DataType::Text,
            DataType::Bool,
        ] {
            assert!(ty.check(&Value::Null));
        }
    }

    #[test]
    fn test_check_no_coercion() {
        assert!(!DataType::Float.check(&Value::Integer(1200)));
        assert!(!DataType::Integer.check(&Value::Float(1.0)));
        assert!(!DataType::Text.check(&Value::Integer(1)));
        assert!(!DataType::Bool.check(&Value::Integer(1)));
    }
}
