use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::debug;

/// A playlist entry, identified by its path.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    /// File name shown in the playlist.
    pub name: String,
    /// Filled once metadata has been read.
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            duration: None,
        }
    }
}

/// Ordered tracks with an optional cursor.
///
/// Invariant: `current` is `None` or a valid index into `tracks`.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track. The first track added becomes current.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        self.tracks.push(Track::new(path));
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    pub fn add_multiple<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for p in paths {
            self.add(p);
        }
    }

    /// Remove the track at `index`. Returns true when the current track changed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.tracks.remove(index);

        match self.current {
            Some(cur) if cur == index => {
                self.current = if self.tracks.is_empty() {
                    None
                } else {
                    Some(index.min(self.tracks.len() - 1))
                };
                true
            }
            Some(cur) if index < cur => {
                self.current = Some(cur - 1);
                false
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }

    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Advance the cursor, wrapping at the end.
    pub fn next(&mut self) -> bool {
        let len = self.tracks.len();
        if len == 0 {
            return false;
        }
        self.current = Some(match self.current {
            Some(cur) => (cur + 1) % len,
            None => 0,
        });
        true
    }

    /// Step the cursor back, wrapping at the start. Without a cursor the
    /// last track becomes current.
    pub fn previous(&mut self) -> bool {
        let len = self.tracks.len();
        if len == 0 {
            return false;
        }
        self.current = Some(match self.current {
            Some(cur) => (cur + len - 1) % len,
            // no cursor counts as "just past the end", not as index -1
            None => len - 1,
        });
        true
    }

    /// Swap the tracks at `from` and `to`. The cursor stays on its track.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        self.tracks.swap(from, to);
        self.current = match self.current {
            Some(cur) if cur == from => Some(to),
            Some(cur) if cur == to => Some(from),
            other => other,
        };
        true
    }

    /// Randomly permute the tracks and clear the cursor.
    pub fn shuffle(&mut self) {
        self.tracks.shuffle(&mut rand::rng());
        self.current = None;
        debug!(len = self.tracks.len(), "playlist shuffled");
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// File name of the current track, empty when there is none.
    pub fn current_name(&self) -> &str {
        self.current().map(|t| t.name.as_str()).unwrap_or("")
    }

    pub fn display_names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|t| t.path == path)
    }

    /// Cache the duration of every entry pointing at `path`.
    pub fn set_duration(&mut self, path: &Path, duration: Duration) {
        for t in self.tracks.iter_mut().filter(|t| t.path == path) {
            t.duration = Some(duration);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}
