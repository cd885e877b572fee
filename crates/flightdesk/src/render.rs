//! Result rendering.
//!
//! Tables are drawn in the familiar "grid" layout:
//!
//! ```text
//! +------+--------+
//! |   id | city   |
//! +======+========+
//! |    1 | London |
//! +------+--------+
//! ```
//!
//! Numbers are right-aligned, everything else left-aligned.

use std::fmt::Write as _;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::FlightBoardEntry;
use crate::record::{RecordSet, Value};

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Bordered grid table
    #[default]
    Table,
    /// Tab-separated text
    Plain,
    /// JSON array of objects
    Json,
}

/// Render a result set in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(set: &RecordSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(grid(set)),
        OutputFormat::Plain => Ok(plain(set)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&set.to_json())?),
    }
}

/// Render the flight board in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_board(entries: &[FlightBoardEntry], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(entries)?);
    }

    let columns = [
        "id", "flight", "from", "to", "departs", "arrives", "status", "pilot",
    ];
    let mut set = RecordSet::new(columns.iter().map(ToString::to_string).collect());
    for entry in entries {
        set.rows.push(vec![
            Value::Integer(entry.id),
            Value::from(entry.flight_number.as_str()),
            Value::Text(format!("{} ({})", entry.from_city, entry.from_code)),
            Value::Text(format!("{} ({})", entry.to_city, entry.to_code)),
            Value::from(entry.departure_time.as_str()),
            Value::from(entry.arrival_time.as_str()),
            Value::from(entry.status.as_str()),
            entry
                .pilot
                .as_deref()
                .map_or(Value::Null, Value::from),
        ]);
    }
    render(&set, format)
}

/// Draw a grid table.
#[must_use]
pub fn grid(set: &RecordSet) -> String {
    let cells: Vec<Vec<String>> = set
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = set
        .columns
        .iter()
        .map(|c| display_width(c) + HEADER_PADDING)
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(display_width(cell));
            }
        }
    }

    // A column is right-aligned when every non-null value in it is numeric.
    let numeric: Vec<bool> = (0..set.columns.len())
        .map(|i| {
            let mut present = set
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .filter(|v| !v.is_null())
                .peekable();
            present.peek().is_some() && present.all(Value::is_numeric)
        })
        .collect();

    let mut out = String::new();
    push_border(&mut out, &widths, '-');
    push_row(&mut out, &widths, &set.columns, &numeric);
    push_border(&mut out, &widths, '=');
    for row in &cells {
        push_row(&mut out, &widths, row, &numeric);
        push_border(&mut out, &widths, '-');
    }
    out.pop();
    out
}

/// Tab-separated header plus rows.
#[must_use]
pub fn plain(set: &RecordSet) -> String {
    let mut out = set.columns.join("\t");
    for row in &set.rows {
        out.push('\n');
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        out.push_str(&line.join("\t"));
    }
    out
}

/// Extra room every column gets beyond its header text.
const HEADER_PADDING: usize = 2;

/// Width of the widest line in `s`.
fn display_width(s: &str) -> usize {
    s.lines().map(|l| l.chars().count()).max().unwrap_or(0)
}

fn push_border(out: &mut String, widths: &[usize], fill: char) {
    out.push('+');
    for w in widths {
        out.extend(std::iter::repeat(fill).take(w + 2));
        out.push('+');
    }
    out.push('\n');
}

/// Write one table row. Multi-line cells stretch the row over as many output
/// lines as the tallest cell needs.
fn push_row<S: AsRef<str>>(out: &mut String, widths: &[usize], cells: &[S], right: &[bool]) {
    let lines: Vec<Vec<&str>> = cells.iter().map(|c| c.as_ref().lines().collect()).collect();
    let height = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        out.push('|');
        for (i, w) in widths.iter().enumerate() {
            let cell = lines.get(i).and_then(|l| l.get(line)).copied().unwrap_or("");
            if right.get(i).copied().unwrap_or(false) {
                let _ = write!(out, " {cell:>w$} |");
            } else {
                let _ = write!(out, " {cell:<w$} |");
            }
        }
        out.push('\n');
    }
}
