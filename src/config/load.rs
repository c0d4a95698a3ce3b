use std::{env, fs, io, path::Path, path::PathBuf};

use super::schema::Settings;

/// Largest album art edge accepted from config, in pixels.
pub const MAX_ART_PIXELS: u32 = 256;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `CASANOVA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CASANOVA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err("audio.default_volume must be within 0.0..=1.0".to_string());
        }
        if self.audio.seek_step == 0 {
            return Err("audio.seek_step must be >= 1".to_string());
        }
        if self.audio.update_interval_ms == 0 {
            return Err("audio.update_interval_ms must be >= 1".to_string());
        }
        if self.download.max_results == 0 {
            return Err("download.max_results must be >= 1".to_string());
        }
        if !(1..=100).contains(&self.download.cover_quality) {
            return Err("download.cover_quality must be within 1..=100".to_string());
        }
        if self.ui.art_width == 0 || self.ui.art_height == 0 || self.ui.waveform_width == 0 {
            return Err("ui art and waveform sizes must be >= 1".to_string());
        }
        if self.ui.art_width > MAX_ART_PIXELS || self.ui.art_height > MAX_ART_PIXELS {
            return Err(format!("ui.art_width and ui.art_height must be <= {MAX_ART_PIXELS}"));
        }
        Ok(())
    }

    /// Write a TOML template holding the default settings to `path`,
    /// creating parent directories. Existing files are left untouched.
    pub fn write_default(path: &Path) -> io::Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = toml::to_string_pretty(&Settings::default())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, body)?;
        Ok(true)
    }
}

/// Resolve the config path from `CASANOVA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CASANOVA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/casanova/config.toml`
/// or `~/.config/casanova/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("casanova").join("config.toml"))
}
