use tracing::{info, warn};

use crate::config;

/// Load and validate settings. Any problem falls back to defaults and is
/// returned so it can be logged once logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

/// Write the default settings to the config path on first run.
pub fn write_template() {
    let Some(path) = config::resolve_config_path() else {
        return;
    };
    match config::Settings::write_default(&path) {
        Ok(true) => info!(path = %path.display(), "wrote default config"),
        Ok(false) => {}
        Err(e) => warn!(path = %path.display(), "could not write default config: {e}"),
    }
}
