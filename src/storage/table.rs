//! Table storage for RustDB
//!
//! A table owns its schema, the identity counter and its rows, kept in a
//! `BTreeMap` so that iteration is always in ascending identity order.
//! Every mutation validates first and writes last: a failed call leaves the
//! table exactly as it was.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::Value;
use crate::catalog::{Column, Schema};
use crate::error::{Error, Result};

/// A stored row: its identity plus one value per schema column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Identity assigned at insert time, never reused
    pub id: u64,
    /// Column name to value, in schema order
    pub values: IndexMap<String, Value>,
}

impl Row {
    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Project the named columns, in the given order
    pub fn project<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Vec<Value> {
        columns
            .into_iter()
            .map(|c| self.values.get(c).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// A table combining schema and row storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    name: String,
    /// Ordered column definitions (with UNIQUE flags)
    columns: Schema,
    /// Last identity handed out; 0 means none yet
    last_id: u64,
    /// Rows keyed by identity
    rows: BTreeMap<u64, Row>,
}

impl Table {
    /// Create a new, empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            columns: schema,
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.columns
    }

    /// Last identity assigned by `insert`
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Number of live rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by identity
    pub fn get(&self, id: u64) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Iterate rows in ascending identity order.
    ///
    /// The iterator borrows the table, so calling `scan` again restarts it.
    pub fn scan(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.values()
    }

    /// Insert a row given one value per column, in column order.
    ///
    /// Returns the identity assigned to the new row.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<u64> {
        let schema = &self.columns;
        if values.len() != schema.column_count() {
            return Err(Error::ArityMismatch {
                table: self.name.clone(),
                expected: schema.column_count(),
                found: values.len(),
            });
        }

        for (column, value) in schema.columns().iter().zip(&values) {
            check_type(column, value)?;
        }

        for (column, value) in schema.columns().iter().zip(&values) {
            if column.unique {
                self.check_unique(&column.name, value, None)?;
            }
        }

        let values: IndexMap<String, Value> = schema
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .zip(values)
            .collect();

        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(id, Row { id, values });
        Ok(id)
    }

    /// Replace one column value of an existing row.
    ///
    /// Returns the number of rows updated (always 1 on success).
    pub fn update(&mut self, id: u64, column: &str, value: Value) -> Result<usize> {
        self.update_columns(id, vec![(column.to_string(), value)])
    }

    /// Replace several column values of an existing row as one change.
    ///
    /// All assignments are validated before any is written. When a column is
    /// assigned more than once the last assignment wins.
    pub fn update_columns(&mut self, id: u64, assignments: Vec<(String, Value)>) -> Result<usize> {
        let mut changes: IndexMap<String, Value> = IndexMap::new();
        for (name, value) in assignments {
            let column = self
                .columns
                .get_column(&name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone(), self.name.clone()))?;
            check_type(column, &value)?;
            changes.insert(name, value);
        }

        if !self.rows.contains_key(&id) {
            return Err(Error::RowNotFound {
                table: self.name.clone(),
                id,
            });
        }

        for (name, value) in &changes {
            let unique = self.columns.get_column(name).map_or(false, |c| c.unique);
            if unique {
                self.check_unique(name, value, Some(id))?;
            }
        }

        let row = self.rows.get_mut(&id).ok_or_else(|| Error::RowNotFound {
            table: self.name.clone(),
            id,
        })?;
        for (name, value) in changes {
            row.values.insert(name, value);
        }
        Ok(1)
    }

    /// Delete a row by identity; deleting a missing row is not an error.
    ///
    /// Returns the number of rows deleted (0 or 1).
    pub fn delete(&mut self, id: u64) -> usize {
        usize::from(self.rows.remove(&id).is_some())
    }

    /// Check the invariants every mutation maintains; used on freshly
    /// loaded snapshots, which may have been edited by hand.
    pub fn verify(&self) -> Result<()> {
        let corrupt = |detail: String| {
            Error::CorruptSnapshot(format!("table '{}': {}", self.name, detail))
        };
        let names = self.columns.column_names();

        for (key, row) in &self.rows {
            if *key != row.id {
                return Err(corrupt(format!("row stored under id {} has id {}", key, row.id)));
            }
            if row.id == 0 || row.id > self.last_id {
                return Err(corrupt(format!(
                    "row id {} is outside 1..={}",
                    row.id, self.last_id
                )));
            }
            if !row.values.keys().map(String::as_str).eq(names.iter().copied()) {
                return Err(corrupt(format!("row {} does not match the table columns", row.id)));
            }
            for column in self.columns.columns() {
                let well_typed = row.get(&column.name).map_or(false, |v| column.data_type.check(v));
                if !well_typed {
                    return Err(corrupt(format!(
                        "row {} holds a non-{} value in column '{}'",
                        row.id, column.data_type, column.name
                    )));
                }
            }
        }

        for column in self.columns.unique_columns() {
            let mut seen: Vec<&Value> = Vec::new();
            for value in self.rows.values().filter_map(|row| row.get(&column.name)) {
                if seen.iter().any(|s| s.sql_eq(value)) {
                    return Err(corrupt(format!(
                        "duplicate value {} in UNIQUE column '{}'",
                        value.to_literal(),
                        column.name
                    )));
                }
                seen.push(value);
            }
        }
        Ok(())
    }

    /// Fail if `value` already appears in `column` in any row other than
    /// `exclude`. NULL never collides.
    fn check_unique(&self, column: &str, value: &Value, exclude: Option<u64>) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let taken = self
            .rows
            .values()
            .filter(|row| Some(row.id) != exclude)
            .filter_map(|row| row.get(column))
            .any(|existing| existing.sql_eq(value));
        if taken {
            return Err(Error::UniqueViolation(column.to_string()));
        }
        Ok(())
    }
}

fn check_type(column: &Column, value: &Value) -> Result<()> {
    if column.data_type.check(value) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type.to_string(),
            found: format!("{} {}", value.type_name(), value.to_literal()),
        })
    }
}
