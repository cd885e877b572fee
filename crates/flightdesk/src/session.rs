//! Interactive, prompt-driven access to the database.
//!
//! A [`Session`] reads answers line by line from any [`BufRead`] and writes
//! prompts and tables to any [`Write`], so the same flows serve the terminal
//! menu and the tests. Typing `EXIT` (any case) at a prompt, or reaching end
//! of input, cancels the operation in progress.

use std::fmt;
use std::io::{BufRead, Write};

use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::model::Table;
use crate::record::{Record, RecordSet, Value};
use crate::render::{self, OutputFormat};
use crate::storage::Storage;
use crate::validate::FieldRules;

const NOT_FOUND: &str = "Cannot find this record in the database";

/// An answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Text(String),
    Exit,
}

/// An entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Show every row of a table.
    ListAll,
    /// Filter a table by one column.
    Search,
    /// Add a row.
    Insert,
    /// Change one column of a row.
    Update,
    /// Remove a row.
    Delete,
    /// Show flights with their route and pilot.
    Board,
    /// Leave the menu.
    Exit,
}

impl MenuAction {
    /// Menu entries in display order; entry `n` is chosen by typing `n + 1`.
    pub const ALL: [MenuAction; 7] = [
        Self::ListAll,
        Self::Search,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Board,
        Self::Exit,
    ];

    /// Parse a typed menu number.
    #[must_use]
    pub fn from_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    fn needs_table(self) -> bool {
        !matches!(self, Self::Board | Self::Exit)
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListAll => "Select all data from a table",
            Self::Search => "Search a table",
            Self::Insert => "Insert a record",
            Self::Update => "Update a record",
            Self::Delete => "Delete a record",
            Self::Board => "Show the flight board",
            Self::Exit => "Exit",
        })
    }
}

/// An interactive session over one database.
#[derive(Debug)]
pub struct Session<'a, R, W> {
    storage: &'a Storage,
    rules: &'a FieldRules,
    input: R,
    output: W,
    format: OutputFormat,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Create a session reading from `input` and writing to `output`.
    pub fn new(storage: &'a Storage, rules: &'a FieldRules, input: R, output: W) -> Self {
        Self {
            storage,
            rules,
            input,
            output,
            format: OutputFormat::Table,
        }
    }

    /// Use a different output format for result tables.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Consume the session, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print every row of a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or output fails.
    pub fn select_all(&mut self, table: Table) -> Result<RecordSet> {
        let all = self.storage.select_all(table)?;
        self.show(&all)?;
        Ok(all)
    }

    /// Print the flight board.
    ///
    /// # Errors
    ///
    /// Returns an error if a table is missing or output fails.
    pub fn board(&mut self) -> Result<()> {
        let entries = self.storage.flight_board()?;
        let rendered = render::render_board(&entries, self.format)?;
        writeln!(self.output, "{rendered}")?;
        Ok(())
    }

    /// Prompt for each column and insert the result.
    ///
    /// Returns the new row id, or `None` if the user cancelled or entered
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is rejected or the insert fails.
    pub fn insert(&mut self, table: Table) -> Result<Option<i64>> {
        let Some(columns) = self.columns_or_report(table)? else {
            return Ok(None);
        };

        writeln!(
            self.output,
            "Enter values for the following fields (leave blank to skip, `EXIT` to cancel):"
        )?;
        let mut record = Record::new(table);
        for column in columns.iter().filter(|c| *c != "id") {
            match self.ask(&format!("{column}: "))? {
                Reply::Exit => {
                    writeln!(self.output, "Insert cancelled.")?;
                    return Ok(None);
                }
                Reply::Text(raw) if raw.trim().is_empty() => {}
                Reply::Text(raw) => record.set(column, Value::from(raw.trim())),
            }
        }

        if record.is_empty() {
            writeln!(self.output, "No data entered.")?;
            return Ok(None);
        }

        self.rules.check_record(&mut record)?;
        let id = self.storage.insert(&record)?;
        let row = self.storage.get(table, id)?;
        self.show(&row)?;
        Ok(Some(id))
    }

    /// Prompt for a column and a value, then print the matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or output fails.
    pub fn search(&mut self, table: Table) -> Result<Option<RecordSet>> {
        let Some(columns) = self.columns_or_report(table)? else {
            return Ok(None);
        };
        let all: Vec<&str> = columns.iter().map(String::as_str).collect();

        let Some(column) = self.choose("Choose a column to filter by:", &all)? else {
            return Ok(None);
        };
        let Reply::Text(raw) = self.ask("Enter a value to filter by:\n")? else {
            return Ok(None);
        };

        let value = self
            .rules
            .parse(table, column, &raw)
            .unwrap_or_else(|_| Value::from(raw.trim()));
        let found = self.storage.search(table, column, &value)?;
        self.show(&found)?;
        Ok(Some(found))
    }

    /// Prompt for a record id, a column and a new value, then apply it.
    ///
    /// A blank value sets the column to `NULL`. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is rejected or the update fails.
    pub fn update(&mut self, table: Table) -> Result<bool> {
        let Some(columns) = self.columns_with_id(table)? else {
            return Ok(false);
        };

        writeln!(self.output, "Enter `EXIT` to quit at any time")?;
        let Some(id) = self.ask_id("Enter the id of the record to update:\n")? else {
            return self.cancelled();
        };
        if self.storage.get(table, id)?.is_empty() {
            writeln!(self.output, "{NOT_FOUND}")?;
            return Ok(false);
        }

        let editable: Vec<&str> = columns
            .iter()
            .map(String::as_str)
            .filter(|c| *c != "id")
            .collect();
        let Some(column) = self.choose("Choose a column to update:", &editable)? else {
            return self.cancelled();
        };
        let Reply::Text(raw) = self.ask(&format!("Enter new value for {column}:\n"))? else {
            return self.cancelled();
        };

        let value = if raw.trim().is_empty() {
            Value::Null
        } else {
            self.rules.parse(table, column, &raw)?
        };

        if self.storage.update(table, id, column, &value)? {
            let row = self.storage.get(table, id)?;
            self.show(&row)?;
            Ok(true)
        } else {
            writeln!(self.output, "{NOT_FOUND}")?;
            Ok(false)
        }
    }

    /// Prompt for a record id and delete it. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if other rows still reference the record.
    pub fn delete(&mut self, table: Table) -> Result<bool> {
        if self.columns_with_id(table)?.is_none() {
            return Ok(false);
        }

        let Some(id) = self.ask_id("Enter the id of the record to delete:\n")? else {
            return self.cancelled();
        };
        if self.storage.delete(table, id)? {
            writeln!(self.output, "Successfully deleted from table {table}")?;
            Ok(true)
        } else {
            writeln!(self.output, "{NOT_FOUND}")?;
            Ok(false)
        }
    }

    /// Ask for confirmation of a destructive action. Only `y` confirms.
    ///
    /// # Errors
    ///
    /// Returns an error if input or output fails.
    pub fn teardown_confirmed(&mut self) -> Result<bool> {
        Ok(matches!(self.ask("Are you sure?(y/n): ")?, Reply::Text(s) if s.trim() == "y"))
    }

    /// Run the main menu until the user exits or input ends.
    ///
    /// Failed operations are reported and the menu continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run_menu(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\n Menu:")?;
            writeln!(self.output, "**********")?;
            for (i, action) in MenuAction::ALL.iter().enumerate() {
                writeln!(self.output, " {}. {action}", i + 1)?;
            }
            writeln!(self.output)?;

            let Reply::Text(choice) = self.ask("Enter your choice: ")? else {
                break;
            };
            let Some(action) = MenuAction::from_choice(&choice) else {
                writeln!(self.output, "Invalid choice")?;
                continue;
            };
            if action == MenuAction::Exit {
                break;
            }

            match self.perform(action) {
                Ok(()) => {}
                Err(Error::Io(e)) => return Err(Error::Io(e)),
                Err(e) if e.is_user_error() => {
                    warn!("{} rejected: {}", action, e);
                    writeln!(self.output, "Error: {e}")?;
                }
                Err(e) => {
                    error!("{} failed: {}", action, e);
                    writeln!(self.output, "Error: {e}")?;
                }
            }
        }
        info!("Leaving menu");
        Ok(())
    }

    fn perform(&mut self, action: MenuAction) -> Result<()> {
        let table = if action.needs_table() {
            match self.choose_table()? {
                Some(table) => table,
                None => return Ok(()),
            }
        } else {
            Table::Flights
        };

        match action {
            MenuAction::ListAll => self.select_all(table).map(drop),
            MenuAction::Search => self.search(table).map(drop),
            MenuAction::Insert => self.insert(table).map(drop),
            MenuAction::Update => self.update(table).map(drop),
            MenuAction::Delete => self.delete(table).map(drop),
            MenuAction::Board => self.board(),
            MenuAction::Exit => Ok(()),
        }
    }

    fn choose_table(&mut self) -> Result<Option<Table>> {
        let titles: Vec<&str> = Table::ALL.iter().map(|t| t.title()).collect();
        let Some(title) = self.choose("Choose a table:", &titles)? else {
            return Ok(None);
        };
        Ok(Table::ALL.into_iter().find(|t| t.title() == title))
    }

    /// List `options` numbered from 1 and read a choice until it is valid.
    fn choose<'o>(&mut self, heading: &str, options: &[&'o str]) -> Result<Option<&'o str>> {
        loop {
            writeln!(self.output, "{heading}")?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.output, "{}) {option}", i + 1)?;
            }
            let Reply::Text(raw) = self.ask("")? else {
                return Ok(None);
            };
            let picked = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i));
            match picked {
                Some(option) => return Ok(Some(*option)),
                None => writeln!(self.output, "Invalid choice")?,
            }
        }
    }

    fn ask_id(&mut self, prompt: &str) -> Result<Option<i64>> {
        loop {
            let Reply::Text(raw) = self.ask(prompt)? else {
                return Ok(None);
            };
            match raw.trim().parse::<i64>() {
                Ok(id) => return Ok(Some(id)),
                Err(_) => writeln!(self.output, "'{}' is not a record id", raw.trim())?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Reply> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Reply::Exit);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().eq_ignore_ascii_case("exit") {
            return Ok(Reply::Exit);
        }
        Ok(Reply::Text(line.to_string()))
    }

    fn columns_or_report(&mut self, table: Table) -> Result<Option<Vec<String>>> {
        let columns = self.storage.columns(table)?;
        if columns.is_empty() {
            writeln!(
                self.output,
                "Table {table} does not exist or has no columns."
            )?;
            return Ok(None);
        }
        Ok(Some(columns))
    }

    fn columns_with_id(&mut self, table: Table) -> Result<Option<Vec<String>>> {
        let Some(columns) = self.columns_or_report(table)? else {
            return Ok(None);
        };
        if !columns.iter().any(|c| c == "id") {
            writeln!(self.output, "No 'id' column found in this table.")?;
            return Ok(None);
        }
        Ok(Some(columns))
    }

    fn cancelled(&mut self) -> Result<bool> {
        writeln!(self.output, "Cancelled.")?;
        Ok(false)
    }

    fn show(&mut self, set: &RecordSet) -> Result<()> {
        let rendered = render::render(set, self.format)?;
        writeln!(self.output, "{rendered}")?;
        Ok(())
    }
}
