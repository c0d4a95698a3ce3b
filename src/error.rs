//! Error types for each subsystem.
//!
//! Playback errors are meant to be shown to the user; media errors are
//! logged and swallowed by callers; download errors end up (truncated) in
//! the search overlay.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures from the playback engine and its audio backend.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no track loaded")]
    NoTrackLoaded,

    #[error("track duration is unknown")]
    ZeroDuration,

    #[error("no audio output device: {0}")]
    OutputDevice(String),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("seek not supported: {0}")]
    Seek(String),
}

/// Failures while extracting metadata, art or waveforms.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("no audio samples")]
    NoSamples,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("tag error: {0}")]
    Tag(#[from] lofty::error::LoftyError),
}

/// Failures from the YouTube search/download pipeline.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch downloader: {0}")]
    Spawn(#[source] io::Error),

    #[error("{0}")]
    ToolFailed(String),

    #[error("unexpected downloader output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("thumbnail request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("downloaded file not found: {0}")]
    NotFound(PathBuf),
}

/// Failures around the playlist folder.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("could not create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine home directory")]
    NoHomeDir,
}
