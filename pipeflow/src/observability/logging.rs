//! Log subscriber installation and log review.

use crate::config::{LogFormat, LogSettings};
use anyhow::{anyhow, Context};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over [`LogSettings::level`]. File output is
/// appended to and never colored.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("invalid log filter '{}'", settings.level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match (&settings.file, settings.format) {
        (None, LogFormat::Text) => builder.try_init(),
        (None, LogFormat::Json) => builder.json().try_init(),
        (Some(path), format) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            match format {
                LogFormat::Text => builder.try_init(),
                LogFormat::Json => builder.json().try_init(),
            }
        }
    };

    installed.map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

/// Returns the ERROR lines of a log file, or `None` if there is no file.
///
/// Works for both text and JSON output.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn scan_error_log(path: impl AsRef<Path>) -> std::io::Result<Option<Vec<String>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let errors = content
        .lines()
        .filter(|line| line.contains("ERROR"))
        .map(|line| line.trim().to_string())
        .collect();
    Ok(Some(errors))
}
