//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::model::Table;
use crate::record::{Record, Value};
use crate::render::OutputFormat;

/// Parse a table name for clap.
fn parse_table(raw: &str) -> Result<Table, String> {
    raw.parse().map_err(|e: crate::Error| e.to_string())
}

/// Parse a `column=value` assignment for clap.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{raw}'")),
    }
}

/// Init command arguments.
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Create the tables without loading seed data
    #[arg(long)]
    pub no_seed: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Table to list (pilots, destinations, flights)
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Table holding the record
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Record id
    pub id: i64,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Table to search
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Column to filter by
    pub column: String,

    /// Value the column must equal
    pub value: String,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Insert command arguments.
#[derive(Debug, Args)]
pub struct InsertCommand {
    /// Table to insert into
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Set a column (repeatable); prompts for every column when omitted
    #[arg(short = 's', long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,
}

impl InsertCommand {
    /// Build a record from the `--set` assignments, skipping blank values.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(self.table);
        for (column, value) in &self.assignments {
            if !value.trim().is_empty() {
                record.set(column, Value::from(value.trim()));
            }
        }
        record
    }
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Table holding the record
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Record id; prompts for everything when omitted
    #[arg(requires = "column")]
    pub id: Option<i64>,

    /// Column to change
    #[arg(requires = "value")]
    pub column: Option<String>,

    /// New value (empty for NULL)
    pub value: Option<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Table holding the record
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Record id
    pub id: i64,
}

/// Board command arguments.
#[derive(Debug, Args)]
pub struct BoardCommand {
    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Drop command arguments.
#[derive(Debug, Args)]
pub struct DropCommand {
    /// Table to drop
    #[arg(value_parser = parse_table)]
    pub table: Table,

    /// Confirm the drop
    #[arg(long)]
    pub yes: bool,
}

/// Teardown command arguments.
#[derive(Debug, Args)]
pub struct TeardownCommand {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        assert_eq!(parse_table("Flights"), Ok(Table::Flights));
        assert!(parse_table("crew").unwrap_err().contains("unknown table"));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("city=Rio de Janeiro"),
            Ok(("city".to_string(), "Rio de Janeiro".to_string()))
        );
        assert_eq!(
            parse_assignment("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_assignment("pilot_id="),
            Ok(("pilot_id".to_string(), String::new()))
        );
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("city").is_err());
    }

    #[test]
    fn test_insert_command_to_record() {
        let cmd = InsertCommand {
            table: Table::Pilots,
            assignments: vec![
                ("first_name".to_string(), "Grace".to_string()),
                ("flight_hours".to_string(), "120".to_string()),
                ("last_name".to_string(), "  ".to_string()),
            ],
        };
        let record = cmd.to_record();
        assert_eq!(record.columns(), vec!["first_name", "flight_hours"]);
        assert_eq!(record.get("flight_hours"), Some(&Value::from("120")));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
