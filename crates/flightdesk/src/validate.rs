//! Field validation applied before values reach the database.
//!
//! `SQLite` enforces uniqueness, `NOT NULL` and the table `CHECK`s; these rules
//! cover formats the schema cannot express and normalize accepted values
//! (upper-cased codes, canonical timestamps, lowercase status).
//!
//! Raw input arrives as text. Only integer columns turn digit strings into
//! numbers, so text columns keep exactly what was typed, leading zeros
//! included.

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;

use crate::config::ValidationConfig;
use crate::error::{Error, Result};
use crate::model::{FlightStatus, Table};
use crate::record::{Record, Value};

/// Compiled validation rules.
#[derive(Debug, Clone)]
pub struct FieldRules {
    flight_number: Regex,
    airport_code: Regex,
    license_number: Regex,
    datetime_format: String,
}

impl FieldRules {
    /// Compile rules from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn from_config(config: &ValidationConfig) -> Result<Self> {
        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::ConfigValidation {
                message: format!("invalid regex pattern for {field}: {e}"),
            })
        };
        Ok(Self {
            flight_number: compile("flight_number_pattern", &config.flight_number_pattern)?,
            airport_code: compile("airport_code_pattern", &config.airport_code_pattern)?,
            license_number: compile("license_number_pattern", &config.license_number_pattern)?,
            datetime_format: config.datetime_format.clone(),
        })
    }

    /// Turn raw user or CSV input into a checked value for `column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value is rejected.
    pub fn parse(&self, table: Table, column: &str, raw: &str) -> Result<Value> {
        self.check(table, column, &Value::from(raw.trim()))
    }

    /// Check one value, returning its normalized form.
    ///
    /// `NULL` passes through untouched; the schema decides whether it is
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value is rejected.
    pub fn check(&self, table: Table, column: &str, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match (table, column) {
            (_, "id") => match value.as_i64() {
                Some(id) if id > 0 => Ok(Value::Integer(id)),
                _ => Err(Error::invalid_value(
                    column,
                    format!("'{value}' is not a valid record id"),
                )),
            },
            (Table::Pilots, "flight_hours") => match value.as_i64() {
                Some(hours) if hours >= 0 => Ok(Value::Integer(hours)),
                _ => Err(Error::invalid_value(
                    column,
                    format!("'{value}' must be a non-negative integer"),
                )),
            },
            (Table::Pilots, "license_number") => {
                Self::matching(column, &self.license_number, &value.to_string().to_ascii_uppercase())
            }
            (Table::Destinations, "airport_code") => {
                Self::matching(column, &self.airport_code, &value.to_string().to_ascii_uppercase())
            }
            (Table::Flights, "flight_number") => {
                Self::matching(column, &self.flight_number, &value.to_string().to_ascii_uppercase())
            }
            (Table::Flights, "departure_time" | "arrival_time") => {
                let raw = value.to_string();
                NaiveDateTime::parse_from_str(raw.trim(), &self.datetime_format)
                    .or_else(|e| {
                        STORED_DATETIME_FORMATS
                            .iter()
                            .find_map(|f| NaiveDateTime::parse_from_str(raw.trim(), f).ok())
                            .ok_or(e)
                    })
                    .map(|dt| Value::Text(stored_datetime(&dt)))
                    .map_err(|e| {
                        Error::invalid_value(
                            column,
                            format!("'{raw}' does not match '{}': {e}", self.datetime_format),
                        )
                    })
            }
            (Table::Flights, "status") => {
                let status: FlightStatus = value.to_string().parse()?;
                Ok(Value::Text(status.as_str().to_string()))
            }
            (Table::Flights, "source_id" | "destination_id" | "pilot_id") => {
                match value.as_i64() {
                    Some(id) if id > 0 => Ok(Value::Integer(id)),
                    _ => Err(Error::invalid_value(
                        column,
                        format!("'{value}' is not a valid record id"),
                    )),
                }
            }
            _ => Ok(value.clone()),
        }
    }

    /// Check and normalize every field of a record in place.
    ///
    /// # Errors
    ///
    /// Returns the first rejected field.
    pub fn check_record(&self, record: &mut Record) -> Result<()> {
        let table = record.table();
        for (column, value) in record.fields_mut() {
            *value = self.check(table, column, value)?;
        }
        Ok(())
    }

    fn matching(column: &str, pattern: &Regex, candidate: &str) -> Result<Value> {
        let candidate = candidate.trim();
        if pattern.is_match(candidate) {
            Ok(Value::Text(candidate.to_string()))
        } else {
            Err(Error::invalid_value(
                column,
                format!("'{candidate}' does not match {}", pattern.as_str()),
            ))
        }
    }
}

/// Stored timestamps are accepted back in whatever the configured format is.
const STORED_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Timestamps are stored as `%Y-%m-%d %H:%M`, with `:%S` appended only when
/// seconds are present, whatever format they were entered in. Both forms
/// share a fixed-width prefix, so text order in `SQLite` is time order.
fn stored_datetime(dt: &NaiveDateTime) -> String {
    if dt.second() == 0 {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
