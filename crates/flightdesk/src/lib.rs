//! `flightdesk` - Flight management over a local `SQLite` database
//!
//! This library provides the storage, validation, seeding and interactive
//! session layers behind the `fdesk` binary: pilots, destinations and flights
//! kept in three related tables and edited one column at a time.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod record;
pub mod render;
pub mod seed;
pub mod session;
pub mod storage;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{FlightBoardEntry, FlightStatus, Table};
pub use record::{Record, RecordSet, Value};
pub use session::Session;
pub use storage::{Storage, StorageStats};
pub use validate::FieldRules;
