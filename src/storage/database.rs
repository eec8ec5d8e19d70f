//! Database: the set of tables, and the unit of persistence

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::table::Table;
use crate::catalog::{Column, Schema};
use crate::error::{Error, Result};

/// All tables, keyed by name, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    tables: IndexMap<String, Table>,
}

impl Database {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table.
    ///
    /// Fails if the name is taken or a column name is repeated.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<&Table> {
        if self.tables.contains_key(name) {
            return Err(Error::DuplicateTable(name.to_string()));
        }

        let mut schema = Schema::new();
        for column in columns {
            let column_name = column.name.clone();
            if !schema.add_column(column) {
                return Err(Error::DuplicateColumn(column_name, name.to_string()));
            }
        }

        let table = self
            .tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name, schema));
        Ok(&*table)
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name for mutation
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// List all table names, in creation order
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Check that every table is stored under its own name and holds its
    /// invariants
    pub fn verify(&self) -> Result<()> {
        for (name, table) in &self.tables {
            if name != table.name() {
                return Err(Error::CorruptSnapshot(format!(
                    "table '{}' is stored under the name '{}'",
                    table.name(),
                    name
                )));
            }
            table.verify()?;
        }
        Ok(())
    }

    /// Get table schema info as a formatted string (for `.schema`)
    pub fn table_info(&self, name: &str) -> Result<String> {
        let table = self.table(name)?;
        let mut info = format!("Table: {}\n", table.name());
        info.push_str("Columns:\n");

        for col in table.schema().columns() {
            let flags = if col.unique { " [UNIQUE]" } else { "" };
            info.push_str(&format!("  {} {}{}\n", col.name, col.data_type, flags));
        }
        info.push_str(&format!(
            "Rows: {} (last id {})\n",
            table.len(),
            table.last_id()
        ));

        Ok(info)
    }
}
