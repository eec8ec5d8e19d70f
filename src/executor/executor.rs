//! Statement executor for RustDB
//!
//! Interprets one parsed statement against a [`Database`] and produces a
//! [`QueryResult`]. Every statement kind is handled by a single match; there
//! is no planning step.

use serde::Serialize;
use std::fmt;

use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::storage::{Database, Row, Table, Value};

/// Name of the synthetic ordinal column prepended to every SELECT result
pub const ORDINAL_COLUMN: &str = "ID";

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names; empty for statements that return no rows
    pub columns: Vec<String>,
    /// Result rows, each starting with the ordinal `ID` value
    pub rows: Vec<Vec<Value>>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Status line
    pub message: String,
}

impl QueryResult {
    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: message.into(),
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: count,
            message: message.into(),
        }
    }

    /// Create a row-returning result; the `ID` ordinal is added here
    pub fn with_rows(mut columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        columns.insert(0, ORDINAL_COLUMN.to_string());
        let rows: Vec<Vec<Value>> = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row.insert(0, Value::Integer(i as i64 + 1));
                row
            })
            .collect();
        let message = format!("Success: Returned {} rows", rows.len());

        Self {
            columns,
            rows,
            affected_rows: 0,
            message,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.columns.is_empty() {
            writeln!(f, "{}", self.columns.join(" | "))?;
            for row in &self.rows {
                let line: Vec<String> = row.iter().map(Value::to_string).collect();
                writeln!(f, "{}", line.join(" | "))?;
            }
        }
        write!(f, "{}", self.message)
    }
}

/// Execution Engine
///
/// Borrows the database for the duration of one statement; the caller is
/// responsible for serializing access.
pub struct ExecutionEngine<'a> {
    db: &'a mut Database,
}

impl<'a> ExecutionEngine<'a> {
    /// Create an engine over `db`
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Execute a parsed statement.
    ///
    /// A failed statement leaves the database unchanged.
    pub fn execute(&mut self, stmt: Statement) -> Result<QueryResult> {
        match stmt {
            Statement::CreateTable(create) => self.execute_create_table(create),
            Statement::Insert(insert) => self.execute_insert(insert),
            Statement::Select(select) => self.execute_select(select),
            Statement::Update(update) => self.execute_update(update),
            Statement::Delete(delete) => self.execute_delete(delete),
        }
    }

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let columns = stmt
            .columns
            .into_iter()
            .map(|def| Column::new(def.name, def.data_type).unique(def.unique))
            .collect();
        self.db.create_table(&stmt.table_name, columns)?;

        Ok(QueryResult::with_message(format!(
            "Success: Table '{}' created",
            stmt.table_name
        )))
    }

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;

        if stmt.columns.is_some() {
            return Err(Error::UnsupportedStatement(
                "INSERT with a column list; supply one value per column instead".to_string(),
            ));
        }
        let row = match <[Vec<Expr>; 1]>::try_from(stmt.values) {
            Ok([row]) => row,
            Err(_) => {
                return Err(Error::UnsupportedStatement(
                    "INSERT supports exactly one VALUES row".to_string(),
                ))
            }
        };

        let values = row.iter().map(literal_value).collect::<Result<Vec<_>>>()?;
        table.insert(values)?;

        Ok(QueryResult::with_affected_rows(1, "Success: Inserted 1 rows"))
    }

    fn execute_select(&self, stmt: SelectStatement) -> Result<QueryResult> {
        let from = stmt.from;
        match from.joins.len() {
            0 => {
                let table = self.db.table(&from.table.name)?;
                let columns = project_columns(&stmt.columns, table, from.table.reference_name())?;
                let rows: Vec<&Row> = match &stmt.where_clause {
                    Some(expr) => {
                        let id = target_id(expr, &from.table)?;
                        table.get(id).into_iter().collect()
                    }
                    None => table.scan().collect(),
                };
                let rows = rows
                    .into_iter()
                    .map(|row| row.project(columns.iter().map(String::as_str)))
                    .collect();

                Ok(QueryResult::with_rows(columns, rows))
            }
            1 => {
                let join = &from.joins[0];
                if stmt.where_clause.is_some() {
                    return Err(Error::UnsupportedStatement(
                        "WHERE on a JOIN is not supported".to_string(),
                    ));
                }
                if stmt.columns != [SelectItem::Wildcard] {
                    return Err(Error::UnsupportedStatement(
                        "only SELECT * is supported on a JOIN".to_string(),
                    ));
                }
                self.execute_join(&from.table, join)
            }
            _ => Err(Error::UnsupportedStatement(
                "only one JOIN per query is supported".to_string(),
            )),
        }
    }

    /// Nested-loop inner join on one column equality.
    ///
    /// Every left row, in identity order, is compared with every right row,
    /// in identity order. Colliding column names are kept side by side.
    fn execute_join(&self, left_ref: &TableRef, join: &Join) -> Result<QueryResult> {
        if join.join_type != JoinType::Inner {
            return Err(Error::UnsupportedStatement(format!(
                "{} is not supported; only INNER JOIN",
                join.join_type
            )));
        }
        let left = self.db.table(&left_ref.name)?;
        let right = self.db.table(&join.table.name)?;

        let condition = join.condition.as_ref().ok_or_else(|| {
            Error::UnsupportedStatement("JOIN requires an ON condition".to_string())
        })?;
        let (left_col, right_col) = join_columns(condition, (left_ref, left), (&join.table, right))?;

        let left_names = left.schema().column_names();
        let right_names = right.schema().column_names();

        let mut rows = Vec::new();
        for l_row in left.scan() {
            let l_val = l_row.get(&left_col).unwrap_or(&Value::Null);
            for r_row in right.scan() {
                let r_val = r_row.get(&right_col).unwrap_or(&Value::Null);
                if l_val.sql_eq(r_val) {
                    let mut values = l_row.project(left_names.iter().copied());
                    values.extend(r_row.project(right_names.iter().copied()));
                    rows.push(values);
                }
            }
        }

        let columns = left_names
            .iter()
            .chain(right_names.iter())
            .map(|c| c.to_string())
            .collect();
        Ok(QueryResult::with_rows(columns, rows))
    }

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;
        let id = match &stmt.where_clause {
            Some(expr) => target_id(expr, &TableRef::new(&stmt.table_name))?,
            None => return Err(missing_where("UPDATE")),
        };

        let assignments = stmt
            .assignments
            .iter()
            .map(|a| Ok((a.column.clone(), literal_value(&a.value)?)))
            .collect::<Result<Vec<_>>>()?;

        let updated = match table.update_columns(id, assignments) {
            Ok(n) => n,
            Err(Error::RowNotFound { .. }) => 0,
            Err(e) => return Err(e),
        };

        Ok(QueryResult::with_affected_rows(
            updated,
            format!("Success: Updated {} rows", updated),
        ))
    }

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;
        let id = match &stmt.where_clause {
            Some(expr) => target_id(expr, &TableRef::new(&stmt.table_name))?,
            None => return Err(missing_where("DELETE")),
        };

        let deleted = table.delete(id);
        Ok(QueryResult::with_affected_rows(
            deleted,
            format!("Success: Deleted {} rows", deleted),
        ))
    }
}

fn missing_where(kind: &str) -> Error {
    Error::UnsupportedStatement(format!("{} requires a WHERE id = <n> clause", kind))
}

/// Convert a literal expression into a value.
///
/// A minus applied to a numeric literal is folded; anything else that is
/// not a literal is rejected.
fn literal_value(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Literal(lit) => Ok(match lit {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::Integer(*i),
            Literal::Float(f) if !f.is_finite() => {
                return Err(Error::UnsupportedStatement(format!(
                    "float literal out of range: {}",
                    expr
                )))
            }
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::Text(s.clone()),
        }),
        Expr::Nested(inner) => literal_value(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match literal_value(inner)? {
            Value::Integer(i) => i.checked_neg().map(Value::Integer).ok_or_else(|| {
                Error::UnsupportedStatement(format!("integer literal out of range: {}", expr))
            }),
            Value::Float(f) if (-f).is_finite() => Ok(Value::Float(-f)),
            _ => Err(not_a_literal(expr)),
        },
        _ => Err(not_a_literal(expr)),
    }
}

fn not_a_literal(expr: &Expr) -> Error {
    Error::UnsupportedStatement(format!("only literal values are supported, got {}", expr))
}

/// Resolve `WHERE id = <n>` to the addressed row identity.
///
/// `id` always means the storage identity. It may be qualified with the
/// table name or alias, and the two sides may be swapped. Identities start
/// at 1, so a negative literal yields 0, which addresses no row.
fn target_id(expr: &Expr, table: &TableRef) -> Result<u64> {
    let unsupported = || {
        Error::UnsupportedStatement(format!(
            "WHERE only supports id = <integer>, got {}",
            expr
        ))
    };

    let (column, value) = match expr {
        Expr::Nested(inner) => return target_id(inner, table),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => match (left.as_ref(), right.as_ref()) {
            (Expr::Column(col), other) | (other, Expr::Column(col)) => (col, other),
            _ => return Err(unsupported()),
        },
        _ => return Err(unsupported()),
    };

    let qualifier_ok = column
        .table
        .as_deref()
        .map_or(true, |q| q == table.name || q == table.reference_name());
    if !qualifier_ok || !column.column.eq_ignore_ascii_case("id") {
        return Err(unsupported());
    }

    match literal_value(value) {
        Ok(Value::Integer(n)) => Ok(u64::try_from(n).unwrap_or(0)),
        _ => Err(unsupported()),
    }
}

/// Column names a single-table SELECT returns, in output order
fn project_columns(items: &[SelectItem], table: &Table, reference: &str) -> Result<Vec<String>> {
    let mut columns = Vec::new();
    for item in items {
        match item {
            SelectItem::Wildcard => {
                columns.extend(table.schema().columns().iter().map(|c| c.name.clone()))
            }
            SelectItem::Expr(Expr::Column(col)) => {
                let known = col
                    .table
                    .as_deref()
                    .map_or(true, |q| q == reference || q == table.name());
                if !known || !table.schema().has_column(&col.column) {
                    return Err(Error::ColumnNotFound(
                        col.to_string(),
                        table.name().to_string(),
                    ));
                }
                columns.push(col.column.clone());
            }
            SelectItem::Expr(expr) => {
                return Err(Error::UnsupportedStatement(format!(
                    "only column names can be selected, got {}",
                    expr
                )))
            }
        }
    }
    Ok(columns)
}

/// Resolve `ON a.x = b.y` into (left column, right column).
///
/// Qualified sides are matched to a table by name or alias, so the sides
/// may come in either order. Unqualified sides are taken positionally.
fn join_columns(
    condition: &Expr,
    (left_ref, left): (&TableRef, &Table),
    (right_ref, right): (&TableRef, &Table),
) -> Result<(String, String)> {
    let unsupported = || {
        Error::UnsupportedStatement(format!(
            "JOIN condition must be one column equality, got {}",
            condition
        ))
    };

    let (a, b) = match condition {
        Expr::Nested(inner) => {
            return join_columns(inner, (left_ref, left), (right_ref, right))
        }
        Expr::BinaryOp {
            left: a,
            op: BinaryOperator::Eq,
            right: b,
        } => match (a.as_ref(), b.as_ref()) {
            (Expr::Column(a), Expr::Column(b)) => (a, b),
            _ => return Err(unsupported()),
        },
        _ => return Err(unsupported()),
    };

    if left_ref.reference_name() == right_ref.reference_name() {
        return Err(Error::UnsupportedStatement(format!(
            "joining '{}' with itself needs an alias on one side",
            left_ref.name
        )));
    }

    // Which side each reference points at: Some(true) = left table
    let side = |col: &ColumnRef| -> Result<Option<bool>> {
        match col.table.as_deref() {
            None => Ok(None),
            Some(q) if q == left_ref.reference_name() => Ok(Some(true)),
            Some(q) if q == right_ref.reference_name() => Ok(Some(false)),
            Some(q) => Err(Error::TableNotFound(q.to_string())),
        }
    };

    let (left_col, right_col) = match (side(a)?, side(b)?) {
        (Some(true), Some(true)) | (Some(false), Some(false)) => return Err(unsupported()),
        (Some(false), _) | (_, Some(true)) => (b, a),
        _ => (a, b),
    };

    for (col, table) in [(left_col, left), (right_col, right)] {
        if !table.schema().has_column(&col.column) {
            return Err(Error::ColumnNotFound(
                col.column.clone(),
                table.name().to_string(),
            ));
        }
    }

    Ok((left_col.column.clone(), right_col.column.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Parser;

    fn run(db: &mut Database, sql: &str) -> Result<QueryResult> {
        let stmt = Parser::parse_sql(sql)?;
        ExecutionEngine::new(db).execute(stmt)
    }

    fn output(db: &mut Database, sql: &str) -> String {
        match run(db, sql) {
            Ok(result) => result.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    fn users_and_posts() -> Database {
        let mut db = Database::new();
        for sql in [
            "CREATE TABLE users (id INT, email TEXT UNIQUE)",
            "CREATE TABLE posts (id INT, user_id INT, title TEXT)",
            "INSERT INTO users VALUES (1, 'ian@test.com')",
            "INSERT INTO posts VALUES (1, 1, 'My First Post')",
        ] {
            run(&mut db, sql).unwrap();
        }
        db
    }

    #[test]
    fn test_create_table() {
        let mut db = Database::new();
        assert_eq!(
            output(&mut db, "CREATE TABLE users (id INT, email TEXT UNIQUE)"),
            "Success: Table 'users' created"
        );
        assert_eq!(
            output(&mut db, "CREATE TABLE users (id INT)"),
            "Error: Table 'users' already exists"
        );
        assert!(db.table("users").unwrap().schema().get_column("email").unwrap().unique);
    }

    #[test]
    fn test_insert_and_unique_violation() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE users (id INT, email TEXT UNIQUE)").unwrap();

        assert_eq!(
            output(&mut db, "INSERT INTO users VALUES (1, 'ian@test.com')"),
            "Success: Inserted 1 rows"
        );
        assert_eq!(
            output(&mut db, "INSERT INTO users VALUES (2, 'ian@test.com')"),
            "Error: UNIQUE constraint violated on column 'email'"
        );
        assert_eq!(db.table("users").unwrap().len(), 1);
    }

    #[test]
    fn test_select_all() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE items (name TEXT, price FLOAT, ok BOOL)").unwrap();
        run(&mut db, "INSERT INTO items VALUES ('a', 1200.0, true)").unwrap();
        run(&mut db, "INSERT INTO items VALUES ('b', 2.5, NULL)").unwrap();

        assert_eq!(
            output(&mut db, "SELECT * FROM items"),
            "ID | name | price | ok\n\
             1 | a | 1200.0 | true\n\
             2 | b | 2.5 | NULL\n\
             Success: Returned 2 rows"
        );
    }

    #[test]
    fn test_select_empty_table() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE t (a INT)").unwrap();
        assert_eq!(output(&mut db, "SELECT * FROM t"), "ID | a\nSuccess: Returned 0 rows");
    }

    #[test]
    fn test_ordinal_is_not_the_identity() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE t (a INT)").unwrap();
        for n in 1..=3 {
            run(&mut db, &format!("INSERT INTO t VALUES ({})", n * 10)).unwrap();
        }
        run(&mut db, "DELETE FROM t WHERE id = 1").unwrap();

        let result = run(&mut db, "SELECT * FROM t").unwrap();
        assert_eq!(
            result.rows,
            vec![
                vec![Value::Integer(1), Value::Integer(20)],
                vec![Value::Integer(2), Value::Integer(30)],
            ]
        );
    }

    #[test]
    fn test_select_projection() {
        let mut db = users_and_posts();
        assert_eq!(
            output(&mut db, "SELECT email, id FROM users"),
            "ID | email | id\n1 | ian@test.com | 1\nSuccess: Returned 1 rows"
        );
        assert_eq!(
            output(&mut db, "SELECT u.email FROM users u"),
            "ID | email\n1 | ian@test.com\nSuccess: Returned 1 rows"
        );
        assert!(matches!(
            run(&mut db, "SELECT nope FROM users"),
            Err(Error::ColumnNotFound(ref c, ref t)) if c == "nope" && t == "users"
        ));
    }

    #[test]
    fn test_select_by_id() {
        let mut db = users_and_posts();
        run(&mut db, "INSERT INTO users VALUES (2, 'b@test.com')").unwrap();

        let result = run(&mut db, "SELECT email FROM users WHERE id = 2").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::from("b@test.com")]]);

        let result = run(&mut db, "SELECT * FROM users WHERE id = 42").unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_join() {
        let mut db = users_and_posts();
        assert_eq!(
            output(&mut db, "SELECT * FROM users JOIN posts ON users.id = posts.user_id"),
            "ID | id | email | id | user_id | title\n\
             1 | 1 | ian@test.com | 1 | 1 | My First Post\n\
             Success: Returned 1 rows"
        );
    }

    #[test]
    fn test_join_with_aliases_and_swapped_condition() {
        let mut db = users_and_posts();
        run(&mut db, "INSERT INTO posts VALUES (2, 1, 'Second')").unwrap();
        run(&mut db, "INSERT INTO posts VALUES (3, 7, 'Orphan')").unwrap();

        let result = run(
            &mut db,
            "SELECT * FROM users u INNER JOIN posts p ON p.user_id = u.id",
        )
        .unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1][5], Value::from("Second"));
        assert_eq!(result.rows[1][0], Value::Integer(2));
    }

    #[test]
    fn test_join_cardinality() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE a (k INT)").unwrap();
        run(&mut db, "CREATE TABLE b (k INT)").unwrap();
        for _ in 0..3 {
            run(&mut db, "INSERT INTO a VALUES (5)").unwrap();
        }
        for _ in 0..4 {
            run(&mut db, "INSERT INTO b VALUES (5)").unwrap();
        }
        run(&mut db, "INSERT INTO b VALUES (6)").unwrap();
        run(&mut db, "INSERT INTO a VALUES (NULL)").unwrap();
        run(&mut db, "INSERT INTO b VALUES (NULL)").unwrap();

        let result = run(&mut db, "SELECT * FROM a JOIN b ON a.k = b.k").unwrap();
        assert_eq!(result.rows.len(), 12);
        assert_eq!(result.message, "Success: Returned 12 rows");
    }

    #[test]
    fn test_join_type_mismatch_never_matches() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE a (k INT)").unwrap();
        run(&mut db, "CREATE TABLE b (k TEXT)").unwrap();
        run(&mut db, "INSERT INTO a VALUES (1)").unwrap();
        run(&mut db, "INSERT INTO b VALUES ('1')").unwrap();

        let result = run(&mut db, "SELECT * FROM a JOIN b ON a.k = b.k").unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_join_errors() {
        let mut db = users_and_posts();
        assert!(matches!(
            run(&mut db, "SELECT * FROM users JOIN ghosts ON users.id = ghosts.id"),
            Err(Error::TableNotFound(_))
        ));
        assert!(matches!(
            run(&mut db, "SELECT * FROM users JOIN posts ON users.id = posts.nope"),
            Err(Error::ColumnNotFound(..))
        ));
        assert!(matches!(
            run(&mut db, "SELECT * FROM users LEFT JOIN posts ON users.id = posts.user_id"),
            Err(Error::UnsupportedStatement(_))
        ));
        assert!(matches!(
            run(&mut db, "SELECT email FROM users JOIN posts ON users.id = posts.user_id"),
            Err(Error::UnsupportedStatement(_))
        ));
        assert!(matches!(
            run(
                &mut db,
                "SELECT * FROM users JOIN posts ON users.id = posts.user_id AND posts.id = 1"
            ),
            Err(Error::UnsupportedStatement(_))
        ));
    }

    #[test]
    fn test_update() {
        let mut db = users_and_posts();
        assert_eq!(
            output(&mut db, "UPDATE users SET email = 'new@test.com' WHERE id = 1"),
            "Success: Updated 1 rows"
        );
        assert_eq!(
            output(&mut db, "UPDATE users SET email = 'x' WHERE id = 999"),
            "Success: Updated 0 rows"
        );
        assert_eq!(
            db.table("users").unwrap().get(1).unwrap().get("email"),
            Some(&Value::from("new@test.com"))
        );
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut db = users_and_posts();
        run(&mut db, "INSERT INTO users VALUES (2, 'b@test.com')").unwrap();

        let result = run(&mut db, "UPDATE users SET id = 20, email = 'ian@test.com' WHERE id = 2");
        assert!(matches!(result, Err(Error::UniqueViolation(_))));

        let result = run(&mut db, "UPDATE users SET email = 'c@test.com', id = 'x' WHERE id = 2");
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));

        let row = db.table("users").unwrap().get(2).unwrap();
        assert_eq!(row.project(["id", "email"]), vec![Value::Integer(2), Value::from("b@test.com")]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut db = users_and_posts();
        run(&mut db, "INSERT INTO users VALUES (2, 'b@test.com')").unwrap();

        assert_eq!(output(&mut db, "DELETE FROM users WHERE id = 2"), "Success: Deleted 1 rows");
        assert_eq!(output(&mut db, "DELETE FROM users WHERE id = 2"), "Success: Deleted 0 rows");
        assert_eq!(output(&mut db, "DELETE FROM users WHERE id = -1"), "Success: Deleted 0 rows");
    }

    #[test]
    fn test_where_restrictions() {
        let mut db = users_and_posts();
        for sql in [
            "DELETE FROM users WHERE email = 'ian@test.com'",
            "DELETE FROM users WHERE id = 1 AND id = 2",
            "DELETE FROM users WHERE id > 1",
            "DELETE FROM users WHERE id = 'one'",
            "DELETE FROM users",
            "UPDATE users SET email = 'x'",
            "DELETE FROM users WHERE id = (SELECT * FROM posts)",
        ] {
            let result = run(&mut db, sql);
            assert!(
                matches!(result, Err(Error::UnsupportedStatement(_))),
                "{} gave {:?}",
                sql,
                result
            );
        }
        assert_eq!(output(&mut db, "DELETE FROM users WHERE users.ID = 1"), "Success: Deleted 1 rows");
    }

    #[test]
    fn test_type_checks() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE products (id INT, name TEXT, price FLOAT)").unwrap();

        assert_eq!(
            output(&mut db, "INSERT INTO products VALUES (1, 'Laptop', 1200)"),
            "Error: Type mismatch on column 'price': expected FLOAT, got INTEGER 1200"
        );
        assert_eq!(
            output(&mut db, "INSERT INTO products VALUES (1, 'Laptop', 1200.0)"),
            "Success: Inserted 1 rows"
        );
        assert!(matches!(
            run(&mut db, "INSERT INTO products VALUES (1, 'Laptop')"),
            Err(Error::ArityMismatch { expected: 3, found: 2, .. })
        ));
        assert!(matches!(
            run(&mut db, "INSERT INTO products VALUES (-5, NULL, -0.5)"),
            Ok(_)
        ));
    }

    #[test]
    fn test_non_finite_float_literal_is_rejected() {
        let mut db = Database::new();
        run(&mut db, "CREATE TABLE readings (v FLOAT)").unwrap();

        let stmt = Statement::Insert(InsertStatement {
            table_name: "readings".to_string(),
            columns: None,
            values: vec![vec![Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(Expr::Literal(Literal::Float(f64::INFINITY))),
            }]],
        });
        let result = ExecutionEngine::new(&mut db).execute(stmt);
        assert!(matches!(result, Err(Error::UnsupportedStatement(_))));
        assert!(db.table("readings").unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_insert_shapes() {
        let mut db = users_and_posts();
        assert!(matches!(
            run(&mut db, "INSERT INTO users (id, email) VALUES (2, 'b')"),
            Err(Error::UnsupportedStatement(_))
        ));
        assert!(matches!(
            run(&mut db, "INSERT INTO users VALUES (2, 'b'), (3, 'c')"),
            Err(Error::UnsupportedStatement(_))
        ));
        assert!(matches!(
            run(&mut db, "INSERT INTO users VALUES (2, email)"),
            Err(Error::UnsupportedStatement(_))
        ));
        assert_eq!(db.table("users").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_table() {
        let mut db = Database::new();
        for sql in [
            "SELECT * FROM ghost",
            "INSERT INTO ghost VALUES (1)",
            "UPDATE ghost SET a = 1 WHERE id = 1",
            "DELETE FROM ghost WHERE id = 1",
        ] {
            assert_eq!(output(&mut db, sql), "Error: Table 'ghost' not found");
        }
    }
}
