use serde::Deserialize;
use tracing::{debug, info};

use super::process::{stderr_reason, tool_command};
use crate::config::DownloadSettings;
use crate::error::DownloadError;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub duration_secs: u64,
    /// `m:ss`
    pub duration_text: String,
    pub channel: String,
    pub url: String,
    pub thumbnail: String,
}

#[derive(Debug, Deserialize)]
struct FlatPlaylist {
    #[serde(default)]
    entries: Vec<Option<FlatEntry>>,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    #[serde(default)]
    id: String,
    title: Option<String>,
    duration: Option<f64>,
    channel: Option<String>,
    uploader: Option<String>,
}

impl FlatEntry {
    fn into_result(self) -> SearchResult {
        let duration_secs = self.duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0) as u64;
        let thumbnail = if self.id.is_empty() {
            String::new()
        } else {
            format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id)
        };
        SearchResult {
            url: format!("https://www.youtube.com/watch?v={}", self.id),
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            duration_secs,
            duration_text: format_duration(duration_secs),
            channel: self
                .channel
                .or(self.uploader)
                .unwrap_or_else(|| "Unknown".to_string()),
            thumbnail,
            id: self.id,
        }
    }
}

pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parse `yt-dlp --flat-playlist -J` output into at most `max` results.
pub fn parse_search_json(json: &[u8], max: usize) -> Result<Vec<SearchResult>, DownloadError> {
    let playlist: FlatPlaylist = serde_json::from_slice(json)?;
    Ok(playlist
        .entries
        .into_iter()
        .flatten()
        .take(max)
        .map(FlatEntry::into_result)
        .collect())
}

/// Search YouTube through `yt-dlp`.
pub fn search(settings: &DownloadSettings, query: &str) -> Result<Vec<SearchResult>, DownloadError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let max = settings.max_results.max(1);
    info!(query, max, "searching");

    let output = tool_command(&settings.ytdlp_path)
        .arg("--flat-playlist")
        .arg("-J")
        .arg("--no-warnings")
        .arg(format!("ytsearch{max}:{query}"))
        .output()
        .map_err(DownloadError::Spawn)?;

    if !output.status.success() {
        return Err(DownloadError::ToolFailed(stderr_reason(&output.stderr)));
    }

    let results = parse_search_json(&output.stdout, max)?;
    debug!(count = results.len(), "search finished");
    Ok(results)
}
