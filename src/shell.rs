//! Interactive SQL shell
//!
//! One statement per input line. Lines starting with `.` are meta commands;
//! `exit` (or end of input) flushes the snapshot and leaves the loop.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;
use tracing::warn;

use crate::coordinator::Coordinator;

/// Prompt shown before every input line
pub const PROMPT: &str = "rdb > ";

const HELP: &str = "\
Commands:
  .help              Show this help message
  .tables            List all tables
  .schema [table]    Show the schema of one table, or of all tables
  .exit, .quit, exit Save the database and leave the shell

SQL:
  CREATE TABLE users (id INT, email TEXT UNIQUE)
  INSERT INTO users VALUES (1, 'ian@test.com')
  SELECT * FROM users JOIN posts ON users.id = posts.user_id
  UPDATE users SET email = 'new@test.com' WHERE id = 1
  DELETE FROM users WHERE id = 1";

/// What the loop should do after one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this text and read the next line
    Print(String),
    /// Nothing to show
    Silent,
    /// Flush and leave
    Exit,
}

/// Line-oriented front end over a shared [`Coordinator`]
pub struct Shell {
    coordinator: Arc<Coordinator>,
}

impl Shell {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    /// Interpret one input line
    pub fn handle_line(&self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Silent;
        }
        if line.eq_ignore_ascii_case("exit") {
            return Outcome::Exit;
        }
        if line.starts_with('.') {
            return self.handle_meta_command(line);
        }

        match self.coordinator.execute(line) {
            Ok(result) => Outcome::Print(result.to_string()),
            Err(e) => Outcome::Print(format!("Error: {}", e)),
        }
    }

    fn handle_meta_command(&self, line: &str) -> Outcome {
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            [".exit"] | [".quit"] => Outcome::Exit,
            [".help"] => Outcome::Print(HELP.to_string()),
            [".tables"] => {
                let tables = self.coordinator.table_names();
                if tables.is_empty() {
                    Outcome::Print("No tables found.".to_string())
                } else {
                    Outcome::Print(tables.join("\n"))
                }
            }
            [".schema", table] => match self.coordinator.describe(table) {
                Ok(info) => Outcome::Print(info.trim_end().to_string()),
                Err(e) => Outcome::Print(format!("Error: {}", e)),
            },
            [".schema"] => {
                let mut out = Vec::new();
                for table in self.coordinator.table_names() {
                    match self.coordinator.describe(&table) {
                        Ok(info) => out.push(info.trim_end().to_string()),
                        Err(e) => out.push(format!("Error: {}", e)),
                    }
                }
                if out.is_empty() {
                    Outcome::Print("No tables found.".to_string())
                } else {
                    Outcome::Print(out.join("\n\n"))
                }
            }
            _ => Outcome::Print(format!(
                "Error: Unknown command '{}'. Type '.help' for available commands.",
                line
            )),
        }
    }

    /// Write the snapshot before leaving
    fn shutdown(&self) {
        if let Err(e) = self.coordinator.flush() {
            eprintln!("Error: {}", e);
        }
    }

    /// Read lines until `exit` or end of input
    pub fn run(&self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.trim_end())?;
                    }
                    match self.handle_line(&line) {
                        Outcome::Print(text) => println!("{}", text),
                        Outcome::Silent => {}
                        Outcome::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read input");
                    eprintln!("Error while reading input: {:?}", err);
                    break;
                }
            }
        }

        self.shutdown();
        println!("Goodbye!");
        Ok(())
    }
}
