use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use rodio::Source;
use tracing::debug;

pub const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    /// Whole seconds, 0 when unknown.
    pub duration_secs: u64,
}

impl TrackMetadata {
    /// `"title — artist"`, or just the title when the artist is unknown.
    pub fn display_title(&self) -> String {
        if self.artist == UNKNOWN_ARTIST {
            self.title.clone()
        } else {
            format!("{} — {}", self.title, self.artist)
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read title, artist and duration. Never fails: unreadable files fall back
/// to the file stem and an unknown artist.
pub fn read_metadata(path: &Path) -> TrackMetadata {
    let mut meta = TrackMetadata {
        title: file_stem(path),
        artist: UNKNOWN_ARTIST.to_string(),
        duration_secs: 0,
    };

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            meta.duration_secs = tagged.properties().duration().as_secs();
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
                    meta.title = v.trim().to_string();
                }
                if let Some(v) = tag.artist().filter(|v| !v.trim().is_empty()) {
                    meta.artist = v.trim().to_string();
                }
            }
        }
        Err(e) => debug!(path = %path.display(), "no tags: {e}"),
    }

    if meta.duration_secs == 0 {
        meta.duration_secs = probe_duration(path).as_secs();
    }
    meta
}

/// Best-effort track length for loading, `Duration::ZERO` when unknown.
pub fn probe_duration(path: &Path) -> Duration {
    if let Ok(tagged) = lofty::read_from_path(path) {
        let d = tagged.properties().duration();
        if !d.is_zero() {
            return d;
        }
    }
    crate::audio::decode(path)
        .ok()
        .and_then(|src| src.total_duration())
        .unwrap_or(Duration::ZERO)
}
