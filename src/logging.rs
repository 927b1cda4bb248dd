//! Diagnostic logging.
//!
//! The TUI owns stdout, so `tracing` output only goes to a file named with
//! `--debug-log`. Without one nothing is installed and every event is
//! dropped.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "NEXLY_LOG";
pub const DEFAULT_DIRECTIVE: &str = "nexly=debug";

fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Append log records to `path`, creating it if needed.
pub fn init_file_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| format!("Failed to open log file {}: {err}", path.display()))?;

    let directive = std::env::var(LOG_ENV_VAR).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directive.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| format!("Failed to install logger: {err}"))?;

    tracing::debug!(path = %path.display(), "logging started");
    Ok(())
}
