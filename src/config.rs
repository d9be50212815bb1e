//! Application configuration
//!
//! Read from a `key=value` file, then overridden by environment variables:
//! - `SENSORLOG_HOST`: producer host (default: localhost)
//! - `SENSORLOG_PORT`: producer port
//! - `SENSORLOG_OUTPUT_DIR`: storage directory
//! - `SENSORLOG_RECORD_WINDOW_MS`: collection window (default: 300000)

use std::path::{Path, PathBuf};

use crate::data::time::HOUR_MILLIS;
use crate::data::{FieldKind, RecordError, Schema, HOUR, MANDATORY_FIELDS, MINUTE};
use crate::ingest::DEFAULT_RECORD_WINDOW_MS;

pub const KEY_HOST: &str = "host";
pub const KEY_PORT: &str = "port";
pub const KEY_OUTPUT_DIR: &str = "output_dir";
pub const KEY_SCHEMA: &str = "schema";
pub const KEY_RECORD_WINDOW_MS: &str = "record_window_ms";

/// Longest collection window; timestamps are ms from midnight
pub const MAX_RECORD_WINDOW_MS: i64 = 24 * HOUR_MILLIS;

/// Environment variable naming the config file when no argument is given
pub const CONFIG_PATH_ENV: &str = "SENSORLOG_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub schema: Schema,
    pub record_window_ms: i64,
}

impl Config {
    pub fn new(port: u16, output_dir: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            host: "localhost".to_string(),
            port,
            output_dir: output_dir.into(),
            schema,
            record_window_ms: DEFAULT_RECORD_WINDOW_MS,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_record_window(mut self, record_window_ms: i64) -> Self {
        self.record_window_ms = record_window_ms;
        self
    }

    /// Load a config file, apply environment overrides and validate
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&text)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config text without touching the environment or filesystem
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut host = None;
        let mut port = None;
        let mut output_dir = None;
        let mut schema = None;
        let mut record_window_ms = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ConfigError::BadLine(line.to_string()))?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                KEY_HOST => host = Some(value.to_string()),
                KEY_PORT => port = Some(parse_value(KEY_PORT, value)?),
                KEY_OUTPUT_DIR => output_dir = Some(PathBuf::from(value)),
                KEY_SCHEMA => schema = Some(Schema::parse(value)?),
                KEY_RECORD_WINDOW_MS => {
                    record_window_ms = Some(parse_value(KEY_RECORD_WINDOW_MS, value)?)
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }

        let port = port.ok_or(ConfigError::MissingKey(KEY_PORT))?;
        let output_dir = output_dir.ok_or(ConfigError::MissingKey(KEY_OUTPUT_DIR))?;
        let schema = schema.ok_or(ConfigError::MissingKey(KEY_SCHEMA))?;

        let mut config = Self::new(port, output_dir, schema);
        if let Some(host) = host {
            config.host = host;
        }
        if let Some(window) = record_window_ms {
            config.record_window_ms = window;
        }
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SENSORLOG_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SENSORLOG_PORT") {
            self.port = parse_value(KEY_PORT, &port)?;
        }
        if let Ok(dir) = std::env::var("SENSORLOG_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(window) = std::env::var("SENSORLOG_RECORD_WINDOW_MS") {
            self.record_window_ms = parse_value(KEY_RECORD_WINDOW_MS, &window)?;
        }
        Ok(())
    }

    /// Check invariants the rest of the system relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.output_dir.is_dir() {
            return Err(ConfigError::OutputDirMissing(self.output_dir.clone()));
        }
        self.validate_schema()?;
        if !(0..=MAX_RECORD_WINDOW_MS).contains(&self.record_window_ms) {
            return Err(ConfigError::InvalidValue {
                key: KEY_RECORD_WINDOW_MS,
                value: self.record_window_ms.to_string(),
            });
        }
        Ok(())
    }

    /// The schema must carry the time fields, with integer hour and minute
    pub fn validate_schema(&self) -> Result<(), ConfigError> {
        if let Some(missing) = MANDATORY_FIELDS.iter().find(|f| !self.schema.contains(f)) {
            return Err(ConfigError::InvalidValue {
                key: KEY_SCHEMA,
                value: format!("missing mandatory field '{}'", missing),
            });
        }
        if let Some(field) = [HOUR, MINUTE]
            .into_iter()
            .find(|f| self.schema.kind_of(f) != Some(FieldKind::Int))
        {
            return Err(ConfigError::InvalidValue {
                key: KEY_SCHEMA,
                value: format!("field '{}' must be integer", field),
            });
        }
        Ok(())
    }

    /// `host:port` of the producer
    pub fn producer_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad config line format: '{0}'")]
    BadLine(String),

    #[error("Unrecognized config key '{0}'")]
    UnknownKey(String),

    #[error("Config missing key '{0}'")]
    MissingKey(&'static str),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid schema: {0}")]
    Schema(#[from] RecordError),

    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),
}
