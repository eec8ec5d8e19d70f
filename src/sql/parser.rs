//! SQL Parser
//!
//! This module parses SQL tokens into an AST.

use super::ast::*;
use super::lexer::Lexer;
use super::token::{Keyword, Token};
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// Deepest expression nesting accepted: parentheses, subqueries, NOT,
/// unary minus and AND/OR chains all count
pub const MAX_EXPR_DEPTH: usize = 64;

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse exactly one statement out of `sql`
    pub fn parse_sql(sql: &str) -> Result<Statement> {
        Parser::new(sql)?.parse()
    }

    /// Parse a single SQL statement.
    ///
    /// An optional trailing semicolon is consumed; anything after it is an
    /// error.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(Error::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: format!("{}", self.current()),
            });
        }

        Ok(stmt)
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.keyword() {
            Some(Keyword::Select) => self.parse_select().map(Statement::Select),
            Some(Keyword::Insert) => self.parse_insert().map(Statement::Insert),
            Some(Keyword::Update) => self.parse_update().map(Statement::Update),
            Some(Keyword::Delete) => self.parse_delete().map(Statement::Delete),
            Some(Keyword::Create) => self.parse_create_table().map(Statement::CreateTable),
            _ if self.is_at_end() => Err(Error::UnexpectedEof("a statement".to_string())),
            _ => Err(Error::UnexpectedToken {
                expected: "SELECT, INSERT, UPDATE, DELETE, or CREATE".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect_keyword(Keyword::Select)?;

        if self.check_keyword(Keyword::Distinct) {
            return Err(Error::UnsupportedStatement(
                "SELECT DISTINCT is not supported".to_string(),
            ));
        }

        // Select list
        let columns = self.parse_select_list()?;

        // FROM clause
        let from = self.parse_from_clause()?;

        // WHERE clause
        let where_clause = if self.parse_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.reject_trailing_clauses()?;

        Ok(SelectStatement {
            columns,
            from,
            where_clause,
        })
    }

    /// Clauses that parse in other dialects but have no meaning here
    fn reject_trailing_clauses(&self) -> Result<()> {
        let clause = match self.keyword() {
            Some(Keyword::Order) => "ORDER BY",
            Some(Keyword::Group) => "GROUP BY",
            Some(Keyword::Having) => "HAVING",
            Some(Keyword::Limit) => "LIMIT",
            Some(Keyword::Offset) => "OFFSET",
            _ => return Ok(()),
        };
        Err(Error::UnsupportedStatement(format!(
            "{} is not supported",
            clause
        )))
    }

    fn parse_select_list(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = Vec::new();

        loop {
            items.push(self.parse_select_item()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance(); // consume comma
        }

        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        // Check for *
        if self.check(&Token::Asterisk) {
            self.advance();
            return Ok(SelectItem::Wildcard);
        }

        Ok(SelectItem::Expr(self.parse_expr()?))
    }

    fn parse_from_clause(&mut self) -> Result<FromClause> {
        self.expect_keyword(Keyword::From)?;

        let table = self.parse_table_ref()?;
        let mut joins = Vec::new();

        // Parse JOINs
        while self.is_join_keyword() {
            joins.push(self.parse_join()?);
        }

        Ok(FromClause { table, joins })
    }

    fn parse_table_ref(&mut self) -> Result<TableRef> {
        let name = self.expect_identifier()?;

        let alias = if self.parse_keyword(Keyword::As) {
            Some(self.expect_identifier()?)
        } else if let Token::Identifier(alias) = self.current().clone() {
            // Alias without AS
            self.advance();
            Some(alias)
        } else {
            None
        };

        Ok(TableRef { name, alias })
    }

    fn is_join_keyword(&self) -> bool {
        matches!(
            self.keyword(),
            Some(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    fn parse_join(&mut self) -> Result<Join> {
        let join_type = self.parse_join_type();
        self.expect_keyword(Keyword::Join)?;
        let table = self.parse_table_ref()?;

        let condition = if self.parse_keyword(Keyword::On) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Join {
            join_type,
            table,
            condition,
        })
    }

    fn parse_join_type(&mut self) -> JoinType {
        let join_type = match self.keyword() {
            Some(Keyword::Inner) => JoinType::Inner,
            Some(Keyword::Left) => JoinType::Left,
            Some(Keyword::Right) => JoinType::Right,
            Some(Keyword::Full) => JoinType::Full,
            Some(Keyword::Cross) => JoinType::Cross,
            // Just JOIN means INNER JOIN
            _ => return JoinType::Inner,
        };
        self.advance();

        if matches!(join_type, JoinType::Left | JoinType::Right | JoinType::Full) {
            self.parse_keyword(Keyword::Outer);
        }
        join_type
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table_name = self.expect_identifier()?;

        // Optional column list
        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect_keyword(Keyword::Values)?;

        // Parse value rows
        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let row = self.parse_expr_list()?;
            self.expect(&Token::RParen)?;
            values.push(row);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect_keyword(Keyword::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = if self.parse_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_identifier()?;

        let where_clause = if self.parse_keyword(Keyword::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== CREATE TABLE Statement ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut unique = false;
        while self.parse_keyword(Keyword::Unique) {
            unique = true;
        }

        Ok(ColumnDef {
            name,
            data_type,
            unique,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let dt = match self.keyword() {
            Some(Keyword::Int | Keyword::Integer | Keyword::BigInt) => DataType::Integer,
            Some(Keyword::Float | Keyword::Double | Keyword::Real) => DataType::Float,
            Some(Keyword::Text | Keyword::Varchar) => DataType::Text,
            Some(Keyword::Bool | Keyword::Boolean) => DataType::Bool,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "data type".to_string(),
                    found: format!("{}", self.current()),
                });
            }
        };
        let is_varchar = self.keyword() == Some(Keyword::Varchar);
        self.advance();

        // VARCHAR(n): the length is accepted and not enforced
        if is_varchar && self.check(&Token::LParen) {
            self.advance();
            self.expect_integer()?;
            self.expect(&Token::RParen)?;
        }

        Ok(dt)
    }

    // ========== Expression Parsing ==========

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or_expr()
    }

    /// Enter one more level of expression nesting
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_EXPR_DEPTH {
            return Err(Error::NestingTooDeep(MAX_EXPR_DEPTH));
        }
        Ok(())
    }

    fn parse_or_expr(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.parse_and_expr()?;

        while self.parse_keyword(Keyword::Or) {
            self.descend()?;
            let right = self.parse_and_expr()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::Or,
                right: Box::new(right),
            };
        }

        self.depth = depth;
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.parse_not_expr()?;

        while self.parse_keyword(Keyword::And) {
            self.descend()?;
            let right = self.parse_not_expr()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::And,
                right: Box::new(right),
            };
        }

        self.depth = depth;
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr> {
        if self.parse_keyword(Keyword::Not) {
            self.descend()?;
            let expr = self.parse_not_expr()?;
            self.depth -= 1;
            Ok(Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(expr),
            })
        } else {
            self.parse_comparison_expr()
        }
    }

    fn parse_comparison_expr(&mut self) -> Result<Expr> {
        let left = self.parse_unary_expr()?;

        // IS NULL / IS NOT NULL
        if self.parse_keyword(Keyword::Is) {
            if self.parse_keyword(Keyword::Not) {
                self.expect_keyword(Keyword::Null)?;
                return Ok(Expr::IsNotNull(Box::new(left)));
            } else {
                self.expect_keyword(Keyword::Null)?;
                return Ok(Expr::IsNull(Box::new(left)));
            }
        }

        // Comparison operators
        let op = match self.current() {
            Token::Eq => Some(BinaryOperator::Eq),
            Token::Neq => Some(BinaryOperator::Neq),
            Token::Lt => Some(BinaryOperator::Lt),
            Token::Gt => Some(BinaryOperator::Gt),
            Token::Lte => Some(BinaryOperator::Lte),
            Token::Gte => Some(BinaryOperator::Gte),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_unary_expr()?;
            Ok(Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Expr> {
        if self.check(&Token::Minus) {
            self.advance();
            self.descend()?;
            let expr = self.parse_unary_expr()?;
            self.depth -= 1;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(expr),
            });
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        match self.current().clone() {
            // Literals
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(n)))
            }
            Token::FloatLiteral(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(n)))
            }
            Token::StringLiteral(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s)))
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }

            // Parenthesized expression or subquery
            Token::LParen => {
                self.advance();
                self.descend()?;
                let expr = if self.check_keyword(Keyword::Select) {
                    Expr::Subquery(Box::new(self.parse_select()?))
                } else {
                    Expr::Nested(Box::new(self.parse_expr()?))
                };
                self.expect(&Token::RParen)?;
                self.depth -= 1;
                Ok(expr)
            }

            // Column, optionally qualified (table.column)
            Token::Identifier(name) => {
                self.advance();

                if self.check(&Token::Dot) {
                    self.advance();
                    let column = self.expect_identifier()?;
                    Ok(Expr::Column(ColumnRef {
                        table: Some(name),
                        column,
                    }))
                } else {
                    Ok(Expr::Column(ColumnRef {
                        table: None,
                        column: name,
                    }))
                }
            }

            Token::Eof => Err(Error::UnexpectedEof("an expression".to_string())),

            _ => Err(Error::UnexpectedToken {
                expected: "expression".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== Helper functions ==========

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = Vec::new();

        loop {
            exprs.push(self.parse_expr()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(exprs)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn keyword(&self) -> Option<Keyword> {
        match self.current() {
            Token::Keyword(keyword) => Some(*keyword),
            _ => None,
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// Consume `keyword` if it is next
    fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        let found = self.check_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        self.expect(&Token::Keyword(keyword))
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(Error::UnexpectedEof(format!("{}", token)))
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("{}", token),
                found: format!("{}", self.current()),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(Error::UnexpectedEof("identifier".to_string())),
            _ => Err(Error::UnexpectedToken {
                expected: "identifier".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(Error::UnexpectedToken {
                expected: "integer".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }
}
