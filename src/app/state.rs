use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use image::RgbImage;

use crate::download::{DownloadEvent, SearchResult};
use crate::media::TrackMetadata;

/// Work the app wants done off the event-loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Metadata, album art and waveform for a freshly loaded track.
    TrackDetails(PathBuf),
    Search(String),
    /// Preview image for result `index` of the search for `query`.
    Thumbnail { query: String, index: usize, url: String },
    Download { url: String, title: String },
}

/// Results coming back from workers.
#[derive(Debug)]
pub enum WorkerMsg {
    Metadata { path: PathBuf, meta: TrackMetadata },
    Art { path: PathBuf, art: RgbImage },
    /// Empty `heights` clears the waveform.
    Waveform { path: PathBuf, heights: Vec<f32> },
    SearchResults {
        query: String,
        results: Result<Vec<SearchResult>, String>,
    },
    Thumbnail {
        query: String,
        index: usize,
        image: RgbImage,
    },
    Download(DownloadEvent),
}

/// Search preview size in pixels; two pixel rows per terminal row.
pub const SEARCH_THUMB_WIDTH: u32 = 24;
pub const SEARCH_THUMB_HEIGHT: u32 = 18;

/// Subtitle shown while a track's metadata is being read.
pub const LOADING_SUBTITLE: &str = "Loading...";

/// Header panel contents for the loaded track.
#[derive(Debug, Clone, Default)]
pub struct NowPlaying {
    pub title: String,
    pub subtitle: String,
    pub art: Option<RgbImage>,
    pub waveform: Vec<f32>,
}

impl NowPlaying {
    pub fn empty() -> Self {
        Self {
            title: "No track loaded".to_string(),
            subtitle: "Select a track to play".to_string(),
            art: None,
            waveform: Vec::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A modal message; any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SearchFocus {
    #[default]
    Query,
    Results,
}

#[derive(Debug, Clone, Default)]
pub struct DownloadStatus {
    pub active: bool,
    pub percent: f32,
    pub text: String,
    /// When set, the status line clears at this instant.
    pub reset_at: Option<Instant>,
}

/// The YouTube search overlay.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub open: bool,
    pub focus: SearchFocus,
    pub query: String,
    /// Query whose results are awaited or shown.
    pub submitted: String,
    pub searching: bool,
    pub status: String,
    pub results: Vec<SearchResult>,
    /// Preview images keyed by result index.
    pub thumbnails: HashMap<usize, RgbImage>,
    pub selected: usize,
    pub download: DownloadStatus,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            open: false,
            focus: SearchFocus::Query,
            query: String::new(),
            submitted: String::new(),
            searching: false,
            status: "Enter a search term to find music".to_string(),
            results: Vec::new(),
            thumbnails: HashMap::new(),
            selected: 0,
            download: DownloadStatus::default(),
        }
    }
}
