//! Error types for flightdesk.
//!
//! This module defines all error types used throughout the flightdesk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A row was rejected by a UNIQUE, CHECK, NOT NULL or FOREIGN KEY constraint.
    #[error("constraint violated: {message}")]
    Constraint {
        /// The message reported by `SQLite`.
        message: String,
    },

    /// The table is managed but not present in the database.
    #[error("table '{0}' does not exist (run `fdesk init` to create it)")]
    MissingTable(String),

    // === Record Errors ===
    /// The named table is not one of the managed tables.
    #[error("unknown table '{0}' (expected pilots, destinations or flights)")]
    UnknownTable(String),

    /// The named column does not exist on the table.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn {
        /// Table that was addressed.
        table: String,
        /// Column that was not found.
        column: String,
    },

    /// The column may not be written by callers.
    #[error("cannot modify the {column} column")]
    ImmutableColumn {
        /// Column that was addressed.
        column: String,
    },

    /// A value failed field validation.
    #[error("invalid value for {column}: {message}")]
    InvalidValue {
        /// Column the value was destined for.
        column: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An insert was attempted with no fields.
    #[error("no data entered for table '{table}'")]
    EmptyRecord {
        /// Table that was addressed.
        table: String,
    },

    /// Seed data could not be read.
    #[error("failed to seed table '{table}': {message}")]
    Seed {
        /// Table being seeded.
        table: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for flightdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an unknown column error.
    #[must_use]
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Classify a `rusqlite` error, pulling constraint violations out of the
    /// generic query bucket.
    #[must_use]
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            let message = match &err {
                rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.clone(),
                other => other.to_string(),
            };
            return Self::Constraint { message };
        }
        Self::DatabaseQuery(err)
    }

    /// Check if this error is a constraint violation.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    /// Check if this error was caused by bad user input rather than the
    /// environment.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Constraint { .. }
                | Self::UnknownTable(_)
                | Self::MissingTable(_)
                | Self::UnknownColumn { .. }
                | Self::ImmutableColumn { .. }
                | Self::InvalidValue { .. }
                | Self::EmptyRecord { .. }
        )
    }
}
