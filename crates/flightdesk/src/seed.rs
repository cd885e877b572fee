//! Initial data loading.
//!
//! Each table can be filled from a small CSV file: a header line naming the
//! columns, then one row per line. Fields are split on `,` and trimmed; empty
//! fields are left out so the column takes its default (or `NULL`). The
//! built-in files are compiled into the binary; a directory of replacements
//! can be configured instead.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::Table;
use crate::record::{Record, Value};
use crate::storage::Storage;
use crate::validate::FieldRules;

const PILOTS_CSV: &str = include_str!("../seed/pilots.csv");
const DESTINATIONS_CSV: &str = include_str!("../seed/destinations.csv");
const FLIGHTS_CSV: &str = include_str!("../seed/flights.csv");

/// Where seed CSVs come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedSource {
    /// The files shipped with flightdesk.
    #[default]
    BuiltIn,
    /// `<dir>/<table>.csv` for each table.
    Directory(PathBuf),
}

impl SeedSource {
    /// Build a source from an optional configured directory.
    #[must_use]
    pub fn from_dir(dir: Option<&Path>) -> Self {
        dir.map_or(Self::BuiltIn, |d| Self::Directory(d.to_path_buf()))
    }

    /// Read the CSV text for a table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Seed`] if the file cannot be read.
    pub fn read(&self, table: Table) -> Result<String> {
        match self {
            Self::BuiltIn => Ok(builtin_csv(table).to_string()),
            Self::Directory(dir) => {
                let path = dir.join(format!("{}.csv", table.name()));
                std::fs::read_to_string(&path).map_err(|e| Error::Seed {
                    table: table.name().to_string(),
                    message: format!("cannot read {}: {e}", path.display()),
                })
            }
        }
    }
}

/// The CSV text compiled into the binary for a table.
#[must_use]
pub fn builtin_csv(table: Table) -> &'static str {
    match table {
        Table::Pilots => PILOTS_CSV,
        Table::Destinations => DESTINATIONS_CSV,
        Table::Flights => FLIGHTS_CSV,
    }
}

/// Outcome of seeding one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The table.
    pub table: Table,
    /// Rows inserted.
    pub inserted: usize,
    /// Rows rejected and skipped.
    pub skipped: usize,
    /// The table already held rows, so nothing was loaded.
    pub already_populated: bool,
}

/// A parsed data line: its 1-based line number and the record, or why the
/// line could not be turned into one.
pub type ParsedLine = (usize, Result<Record>);

/// Parse CSV text into records for `table`.
///
/// # Errors
///
/// Returns [`Error::Seed`] if the header line is missing. Per-line problems
/// are reported inside the returned list.
pub fn parse_csv(table: Table, text: &str) -> Result<Vec<ParsedLine>> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(Error::Seed {
            table: table.name().to_string(),
            message: "missing header line".to_string(),
        });
    };
    let header: Vec<String> = header
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let parsed = lines
        .map(|(idx, line)| {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != header.len() {
                return (
                    line_no,
                    Err(Error::Seed {
                        table: table.name().to_string(),
                        message: format!(
                            "line {line_no} has {} fields, header has {}",
                            fields.len(),
                            header.len()
                        ),
                    }),
                );
            }

            let mut record = Record::new(table);
            for (column, field) in header.iter().zip(fields) {
                if !field.is_empty() {
                    record.set(column, Value::from(field));
                }
            }
            (line_no, Ok(record))
        })
        .collect();

    Ok(parsed)
}

/// Load seed rows into one table.
///
/// Rows that fail validation or are rejected by the database are logged and
/// skipped. A table that already holds rows is left untouched.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or parsed, or the table is
/// missing.
pub fn seed_table(
    storage: &Storage,
    rules: &FieldRules,
    table: Table,
    source: &SeedSource,
) -> Result<SeedReport> {
    let mut report = SeedReport {
        table,
        inserted: 0,
        skipped: 0,
        already_populated: false,
    };

    if storage.count(table)? > 0 {
        debug!("Table {} already populated, not seeding", table);
        report.already_populated = true;
        return Ok(report);
    }

    let text = source.read(table)?;
    let lines = parse_csv(table, &text)?;

    storage.in_transaction(|storage| {
        for (line_no, parsed) in lines {
            let outcome = parsed.and_then(|mut record| {
                rules.check_record(&mut record)?;
                storage.insert(&record)
            });
            match outcome {
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    warn!("Skipping {} seed line {}: {}", table, line_no, e);
                    report.skipped += 1;
                }
            }
        }
        Ok(())
    })?;

    info!(
        "Successfully populated table {} ({} rows, {} skipped)",
        table, report.inserted, report.skipped
    );
    Ok(report)
}

/// Create every table and load its seed rows, in dependency order.
///
/// # Errors
///
/// Returns the first table-level error.
pub fn seed_all(
    storage: &Storage,
    rules: &FieldRules,
    source: &SeedSource,
) -> Result<Vec<SeedReport>> {
    Table::ALL
        .into_iter()
        .map(|table| {
            storage.create_table(table)?;
            seed_table(storage, rules, table, source)
        })
        .collect()
}

/// Seed a database that this open just created, when seeding is enabled.
///
/// An existing file is never touched, even if its tables are empty.
///
/// # Errors
///
/// Returns the first table-level error from [`seed_all`].
pub fn seed_if_created(
    storage: &Storage,
    rules: &FieldRules,
    source: &SeedSource,
    enabled: bool,
) -> Result<Vec<SeedReport>> {
    if !(enabled && storage.was_created()) {
        return Ok(Vec::new());
    }
    info!("New database at {}, loading seed data", storage.path().display());
    let reports = seed_all(storage, rules, source)?;
    for report in &reports {
        debug!("{:?}", report);
    }
    Ok(reports)
}

/// Create every table, loading seed rows only when `load` is set.
///
/// # Errors
///
/// Returns an error if a table cannot be created or seeded.
pub fn initialize(
    storage: &Storage,
    rules: &FieldRules,
    source: &SeedSource,
    load: bool,
) -> Result<Vec<SeedReport>> {
    if load {
        return seed_all(storage, rules, source);
    }
    for table in Table::ALL {
        storage.create_table(table)?;
    }
    Ok(Vec::new())
}
