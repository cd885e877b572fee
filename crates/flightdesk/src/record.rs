//! Column-oriented row types.
//!
//! Every CRUD path in flightdesk addresses tables by column name, so rows are
//! carried as ordered `(column, value)` pairs rather than per-table structs.

use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::model::Table;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Real(f64),
    /// Text.
    Text(String),
}

impl Value {
    /// The value as an integer, if it is one or is text holding one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null | Self::Real(_) => None,
        }
    }

    /// Whether the value is SQL `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value should be right-aligned in a table.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(n) => Self::Integer(n),
            ValueRef::Real(x) => Self::Real(x),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Self::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Integer(n) => ToSqlOutput::Borrowed(ValueRef::Integer(*n)),
            Self::Real(x) => ToSqlOutput::Borrowed(ValueRef::Real(*x)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// A set of column values destined for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: Table,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record for the given table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self {
            table,
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// The table this record targets.
    #[must_use]
    pub fn table(&self) -> Table {
        self.table
    }

    /// Set a column, replacing any previous value. Column names are
    /// lowercased.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        let column = column.trim().to_ascii_lowercase();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    /// Get a column's value.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        let column = column.to_ascii_lowercase();
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    /// Column names in insertion order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Values in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        self.fields.iter().map(|(_, v)| v).collect()
    }

    /// Replace a value in place.
    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.fields.iter_mut().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of fields set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(c, v)| (c.clone(), serde_json::to_value(v).unwrap_or_default()))
            .collect();
        let body = serde_json::to_string_pretty(&map).map_err(|_| fmt::Error)?;
        write!(f, "[{}]: \n{body}", self.table)
    }
}

/// The result of a query: column names plus rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    /// Column names, in select order.
    pub columns: Vec<String>,
    /// Row values, each the same length as `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create an empty result with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Value of `column` in row `row`.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Render as a JSON array of objects keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), serde_json::to_value(v).unwrap_or_default()))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}
