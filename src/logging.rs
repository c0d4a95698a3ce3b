//! File-backed `tracing` setup.
//!
//! The terminal is owned by the UI while the player runs, so log output
//! goes to a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global subscriber. Returns the log file path on success.
///
/// `RUST_LOG` overrides `settings.level`. Failures are reported to the
/// caller and otherwise ignored; the player works without logs.
pub fn init(settings: &LogSettings) -> Result<PathBuf, String> {
    let path = settings
        .file
        .clone()
        .or_else(default_log_path)
        .ok_or_else(|| "no writable log location".to_string())?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(path)
}

/// `$XDG_STATE_HOME/casanova/casanova.log`, falling back to the platform
/// local data directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("casanova").join("casanova.log"))
}
