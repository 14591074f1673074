//! Run configuration.
//!
//! Settings are plain data threaded into each run; nothing here is global.

use crate::snapshot::DEFAULT_SNAPSHOT_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding [`RunSettings::snapshot_dir`].
pub const ENV_SNAPSHOT_DIR: &str = "PIPEFLOW_SNAPSHOT_DIR";
/// Environment variable overriding [`RunSettings::debug`].
pub const ENV_DEBUG: &str = "PIPEFLOW_DEBUG";
/// Environment variable overriding [`LogSettings::level`].
pub const ENV_LOG_LEVEL: &str = "PIPEFLOW_LOG_LEVEL";
/// Environment variable overriding [`LogSettings::format`].
pub const ENV_LOG_FORMAT: &str = "PIPEFLOW_LOG_FORMAT";
/// Environment variable overriding [`LogSettings::file`].
pub const ENV_LOG_FILE: &str = "PIPEFLOW_LOG_FILE";

/// Settings for one pipeline run or replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Directory failure snapshots are written to.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    /// Debug mode: failures are logged but never snapshotted.
    #[serde(default)]
    pub debug: bool,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogSettings,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_DIR)
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            debug: false,
            log: LogSettings::default(),
        }
    }
}

impl RunSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads settings from the process environment, starting from defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Parses settings from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid settings JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Unset or unparsable variables leave the current value in place.
    #[must_use]
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SNAPSHOT_DIR).filter(|v| !v.trim().is_empty()) {
            self.snapshot_dir = PathBuf::from(dir);
        }
        if let Some(debug) = lookup(ENV_DEBUG).and_then(|v| parse_flag(&v)) {
            self.debug = debug;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| LogFormat::parse(&v)) {
            self.log.format = format;
        }
        if let Some(file) = lookup(ENV_LOG_FILE).filter(|v| !v.trim().is_empty()) {
            self.log.file = Some(PathBuf::from(file));
        }
        self
    }

    /// Sets the snapshot directory.
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Sets debug mode.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_log(mut self, log: LogSettings) -> Self {
        self.log = log;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses `text` or `json`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Log file; stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LogSettings {
    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Writes logs to a file instead of stderr.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = RunSettings::default();
        assert_eq!(settings.snapshot_dir, PathBuf::from("snapshots"));
        assert!(!settings.debug);
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Text);
        assert!(settings.log.file.is_none());
    }

    #[test]
    fn test_overlay() {
        let settings = RunSettings::default().overlay(lookup(&[
            (ENV_SNAPSHOT_DIR, "/tmp/snaps"),
            (ENV_DEBUG, "yes"),
            (ENV_LOG_LEVEL, "pipeflow=debug"),
            (ENV_LOG_FORMAT, "JSON"),
            (ENV_LOG_FILE, "run.log"),
        ]));

        assert_eq!(settings.snapshot_dir, PathBuf::from("/tmp/snaps"));
        assert!(settings.debug);
        assert_eq!(settings.log.level, "pipeflow=debug");
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.log.file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_overlay_ignores_garbage() {
        let base = RunSettings::default().with_debug(true);
        let settings = base.clone().overlay(lookup(&[
            (ENV_DEBUG, "maybe"),
            (ENV_LOG_FORMAT, "xml"),
            (ENV_SNAPSHOT_DIR, "  "),
        ]));

        assert_eq!(settings, base);
    }

    #[test]
    fn test_from_json_str() {
        let settings =
            RunSettings::from_json_str(r#"{"debug": true, "log": {"format": "json"}}"#).unwrap();

        assert!(settings.debug);
        assert_eq!(settings.snapshot_dir, PathBuf::from("snapshots"));
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.log.level, "info");

        assert!(RunSettings::from_json_str(r#"{"debug": "sometimes"}"#).is_err());
    }
}
