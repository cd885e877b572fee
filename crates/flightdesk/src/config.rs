//! Configuration management for flightdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::error::{Error, Result};
use crate::render::OutputFormat;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightdesk";

/// Default database name.
const DEFAULT_DATABASE_NAME: &str = "flights";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTDESK_`, sections separated
///    by `__`, e.g. `FLIGHTDESK_DATABASE__SEED_ON_CREATE=false`)
/// 2. TOML config file at `~/.config/flightdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Field validation rules.
    pub validation: ValidationConfig,
    /// Output configuration.
    pub display: DisplayConfig,
}

/// Database-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Logical database name. The file is `<Name>.db` and the log file
    /// `flight_management_<name>.log`.
    pub name: String,
    /// Explicit database file, overriding the name-derived path.
    pub path: Option<PathBuf>,
    /// Load the seed CSVs when the database file is first created.
    pub seed_on_create: bool,
    /// Directory holding `pilots.csv`, `destinations.csv` and `flights.csv`.
    /// The built-in seed data is used when unset.
    pub seed_dir: Option<PathBuf>,
    /// Enforce foreign keys between flights, destinations and pilots.
    pub foreign_keys: bool,
}

/// Logging-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a per-database log file.
    pub file_enabled: bool,
    /// Directory for log files. Defaults to the data directory.
    pub directory: Option<PathBuf>,
    /// Level written to the log file.
    pub level: String,
}

/// Patterns and formats applied to incoming field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Regex a flight number must match.
    pub flight_number_pattern: String,
    /// Regex an airport code must match.
    pub airport_code_pattern: String,
    /// Regex a pilot license number must match.
    pub license_number_pattern: String,
    /// `strftime` format for departure and arrival times.
    pub datetime_format: String,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default output format for listings.
    pub format: OutputFormat,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATABASE_NAME.to_string(),
            path: None, // Resolved from the name at runtime
            seed_on_create: true,
            seed_dir: None,
            foreign_keys: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: true,
            directory: None,
            level: "debug".to_string(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            flight_number_pattern: r"^[A-Z0-9]{2}[0-9]{1,4}$".to_string(),
            airport_code_pattern: r"^[A-Z]{3}$".to_string(),
            license_number_pattern: r"^[A-Z0-9-]{4,20}$".to_string(),
            datetime_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading `config_path` instead of
    /// the default file when given.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("FLIGHTDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let name = &self.database.name;
        if name.is_empty() {
            return Err(Error::ConfigValidation {
                message: "database name cannot be empty".to_string(),
            });
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "database name '{name}' may only contain letters, digits, '_' and '-'"
                ),
            });
        }

        for (field, pattern) in [
            ("flight_number_pattern", &self.validation.flight_number_pattern),
            ("airport_code_pattern", &self.validation.airport_code_pattern),
            (
                "license_number_pattern",
                &self.validation.license_number_pattern,
            ),
        ] {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("invalid regex pattern for {field}: {pattern}"),
                });
            }
        }

        let format = &self.validation.datetime_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| item == Item::Error) {
            return Err(Error::ConfigValidation {
                message: format!("invalid datetime_format: '{format}'"),
            });
        }

        if LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid logging level: '{}'", self.logging.level),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            Self::default_data_dir().join(format!("{}.db", capitalize(&self.database.name)))
        })
    }

    /// Get the log directory, resolving defaults if not set.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// File name of the per-database log.
    #[must_use]
    pub fn log_file_name(&self) -> String {
        format!("flight_management_{}.log", self.database.name)
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.name, "flights");
        assert!(config.database.seed_on_create);
        assert!(config.database.foreign_keys);
        assert!(config.logging.file_enabled);
        assert_eq!(config.display.format, OutputFormat::Table);
    }

    #[test]
    fn test_default_validation_config() {
        let validation = ValidationConfig::default();
        assert_eq!(validation.datetime_format, "%Y-%m-%d %H:%M");
        assert!(regex::Regex::new(&validation.airport_code_pattern)
            .unwrap()
            .is_match("LHR"));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let mut config = Config::default();
        config.database.name = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database name"));
    }

    #[test]
    fn test_validate_unsafe_name() {
        let mut config = Config::default();
        config.database.name = "../etc".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("may only contain"));
    }

    #[test]
    fn test_validate_invalid_regex() {
        let mut config = Config::default();
        config.validation.flight_number_pattern = "[invalid".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("flight_number_pattern"));
    }

    #[test]
    fn test_validate_invalid_datetime_format() {
        let mut config = Config::default();
        config.validation.datetime_format = "%Y-%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("datetime_format"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("logging level"));
    }

    #[test]
    fn test_database_path_capitalizes_name() {
        let mut config = Config::default();
        config.database.name = "testING".to_string();

        let path = config.database_path();
        assert_eq!(path.file_name().unwrap(), "Testing.db");
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.database.path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_log_file_name() {
        let mut config = Config::default();
        config.database.name = "Testing".to_string();
        assert_eq!(config.log_file_name(), "flight_management_Testing.log");
    }

    #[test]
    fn test_log_dir_custom() {
        let mut config = Config::default();
        config.logging.directory = Some(PathBuf::from("/var/log/fd"));
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/fd"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("flights"), "Flights");
        assert_eq!(capitalize("FLIGHTS"), "Flights");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flightdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\nname = \"training\"\nseed_on_create = false\n\n[display]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database.name, "training");
        assert!(!config.database.seed_on_create);
        assert_eq!(config.display.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[validation]\nairport_code_pattern = \"(\"\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_database_config_deserialize() {
        let json = r#"{"name": "ops", "foreign_keys": false}"#;
        let database: DatabaseConfig = serde_json::from_str(json).unwrap();
        assert_eq!(database.name, "ops");
        assert!(!database.foreign_keys);
        assert!(database.seed_on_create);
    }
}
