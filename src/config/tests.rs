use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_casanova_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CASANOVA_CONFIG_PATH", "/tmp/casanova-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/casanova-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("casanova")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("casanova")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_player_constants() {
    let s = Settings::default();
    assert_eq!(s.audio.default_volume, 0.7);
    assert_eq!(s.audio.seek_step, 5);
    assert_eq!(s.audio.update_interval_ms, 250);
    assert_eq!(s.download.max_results, 7);
    assert_eq!(s.download.cover_max_size, 500);
    assert_eq!(s.download.cover_quality, 85);
    assert_eq!(s.download.album_label, "YouTube Downloads");
    assert_eq!(
        s.library.extensions,
        vec!["mp3", "wav", "flac", "ogg", "m4a", "aac"]
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
default_volume = 0.25
seek_step = 10

[ui]
header_text = "hello"
show_art = false
art_width = 16
art_height = 8

[library]
playlist_dir = "/tmp/my-playlist"
extensions = ["mp3"]
recursive = false
autoload = false

[download]
ytdlp_path = "/opt/bin/yt-dlp"
max_results = 3
album_label = "Grabbed"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CASANOVA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CASANOVA__AUDIO__SEEK_STEP");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.default_volume, 0.25);
    assert_eq!(s.audio.seek_step, 10);
    // untouched keys keep their defaults
    assert_eq!(s.audio.update_interval_ms, 250);
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.show_art);
    assert_eq!(s.ui.art_width, 16);
    assert_eq!(s.ui.art_height, 8);
    assert_eq!(
        s.library.playlist_dir.as_deref(),
        Some(std::path::Path::new("/tmp/my-playlist"))
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.autoload);
    assert_eq!(s.download.ytdlp_path, "/opt/bin/yt-dlp");
    assert_eq!(s.download.max_results, 3);
    assert_eq!(s.download.album_label, "Grabbed");
    assert_eq!(s.logging.level, "debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
seek_step = 10
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CASANOVA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CASANOVA__AUDIO__SEEK_STEP", "2");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.seek_step, 2);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.default_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.seek_step = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.download.max_results = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.download.cover_quality = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ui.art_height = 0;
    assert!(s.validate().is_err());
}

#[test]
fn validate_caps_album_art_size() {
    let mut s = Settings::default();
    s.ui.art_width = 256;
    s.ui.art_height = 256;
    assert!(s.validate().is_ok());

    s.ui.art_width = 257;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ui.art_height = 65_535;
    assert!(s.validate().is_err());
}

#[test]
fn write_default_creates_a_loadable_template_once() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("nested").join("config.toml");

    assert!(Settings::write_default(&cfg_path).unwrap());
    assert!(cfg_path.exists());
    // second call leaves the file alone
    assert!(!Settings::write_default(&cfg_path).unwrap());

    let _g1 = EnvGuard::set("CASANOVA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let s = Settings::load().unwrap();
    assert_eq!(s.download.max_results, 7);
    assert_eq!(s.library.extensions.len(), 6);
    assert!(s.library.playlist_dir.is_none());
}
