use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/casanova/config.toml` or `~/.config/casanova/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CASANOVA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
    pub download: DownloadSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume applied at startup, in `[0.0, 1.0]`.
    pub default_volume: f32,
    /// Seconds to jump with the seek keys.
    pub seek_step: u64,
    /// How often the event loop redraws and polls for track end (milliseconds).
    pub update_interval_ms: u64,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.7,
            seek_step: 5,
            update_interval_ms: 250,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether to draw embedded album art in the now-playing panel.
    pub show_art: bool,
    /// Album art bitmap width in pixels (one terminal column per pixel).
    pub art_width: u32,
    /// Album art bitmap height in pixels (two pixels per terminal row).
    pub art_height: u32,
    /// Height used to scale waveform peaks; bars are at most half of it.
    pub waveform_height: u32,
    /// Number of waveform bars computed per track.
    pub waveform_width: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ casanova ~ ".to_string(),
            show_art: true,
            art_width: 32,
            art_height: 32,
            waveform_height: 16,
            waveform_width: 480,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder scanned by "load playlist folder" and used as the download target.
    /// Defaults to `~/Music/playlist`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Load the playlist folder at startup when no paths are given.
    pub autoload: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            playlist_dir: None,
            extensions: ["mp3", "wav", "flac", "ogg", "m4a", "aac"]
                .into_iter()
                .map(String::from)
                .collect(),
            recursive: true,
            follow_links: true,
            autoload: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// `yt-dlp` executable (name on `PATH` or absolute path).
    pub ytdlp_path: String,
    /// Passed to `yt-dlp --ffmpeg-location` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_location: Option<PathBuf>,
    /// Number of search results requested.
    pub max_results: usize,
    /// Target audio format for `--audio-format`.
    pub audio_format: String,
    /// Target quality for `--audio-quality`.
    pub audio_quality: String,
    /// Album tag written to downloaded files.
    pub album_label: String,
    /// Embedded cover art is shrunk to fit a square of this size.
    pub cover_max_size: u32,
    /// JPEG quality of embedded cover art.
    pub cover_quality: u8,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_location: None,
            max_results: 7,
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            album_label: "YouTube Downloads".to_string(),
            cover_max_size: 500,
            cover_quality: 85,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file path. Defaults to the XDG state dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
