//! The application model: what the player shows and what each user action
//! does to the engine and the playlist.
//!
//! `App` never spawns threads. Slow work is queued as `Job`s for the
//! runtime and comes back as `WorkerMsg`s through `apply_worker_msg`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::state::*;
use crate::audio::PlaybackEngine;
use crate::config::Settings;
use crate::download::DownloadEvent;
use crate::error::PlaybackError;
use crate::library;
use crate::media;
use crate::playlist::Playlist;

const DOWNLOAD_OK_RESET: Duration = Duration::from_secs(2);
const DOWNLOAD_ERR_RESET: Duration = Duration::from_secs(3);
const ERROR_PREVIEW_CHARS: usize = 50;

pub struct App {
    pub engine: PlaybackEngine,
    pub playlist: Playlist,
    /// Highlighted row in the playlist view.
    pub selected: usize,
    pub now_playing: NowPlaying,
    pub notice: Option<Notice>,
    pub search: SearchState,
    /// Text of the "add path" prompt while it is open.
    pub prompt: Option<String>,
    pub settings: Settings,
    jobs: Vec<Job>,
}

impl App {
    pub fn new(engine: PlaybackEngine, settings: Settings) -> Self {
        Self {
            engine,
            playlist: Playlist::new(),
            selected: 0,
            now_playing: NowPlaying::empty(),
            notice: None,
            search: SearchState::default(),
            prompt: None,
            settings,
            jobs: Vec::new(),
        }
    }

    /// Drain the queued background work.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    pub fn has_tracks(&self) -> bool {
        !self.playlist.is_empty()
    }

    // --- playlist actions ---

    /// Append `paths`. When they are the first tracks, the first one is loaded.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) -> usize {
        let added = paths.len();
        if added == 0 {
            return 0;
        }
        self.playlist.add_multiple(paths);
        info!(added, total = self.playlist.len(), "tracks added");
        if self.playlist.len() == added {
            self.load_current_track();
        }
        added
    }

    pub fn remove_selected(&mut self) {
        if self.selected >= self.playlist.len() {
            return;
        }
        let changed = self.playlist.remove(self.selected);
        self.clamp_selection();

        if changed {
            self.engine.stop();
            if self.playlist.is_empty() {
                self.reset_now_playing();
            } else {
                self.load_current_track();
            }
        }
    }

    pub fn clear_playlist(&mut self) {
        self.engine.reset();
        self.playlist.clear();
        self.selected = 0;
        self.reset_now_playing();
    }

    pub fn move_selected_up(&mut self) {
        if self.selected > 0 && self.playlist.reorder(self.selected, self.selected - 1) {
            self.selected -= 1;
        }
    }

    pub fn move_selected_down(&mut self) {
        if self.selected + 1 < self.playlist.len()
            && self.playlist.reorder(self.selected, self.selected + 1)
        {
            self.selected += 1;
        }
    }

    pub fn shuffle(&mut self) {
        if self.playlist.len() < 2 {
            return;
        }
        self.playlist.shuffle();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.playlist.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Index of the track the engine has loaded, for highlighting.
    pub fn playing_index(&self) -> Option<usize> {
        self.engine
            .loaded_path()
            .and_then(|p| self.playlist.position_of(p))
    }

    /// Load every audio file from the playlist folder, creating it if needed.
    pub fn load_default_folder(&mut self) {
        let dir = match library::playlist_dir(&self.settings.library) {
            Ok(dir) => dir,
            Err(e) => {
                self.notice = Some(Notice::error("Error", e.to_string()));
                return;
            }
        };

        match library::ensure_folder(&dir) {
            Ok(true) => {
                self.notice = Some(Notice::info(
                    "Folder Created",
                    format!(
                        "Created playlist folder at:\n{}\n\nAdd your music files there and press o again!",
                        dir.display()
                    ),
                ));
                return;
            }
            Ok(false) => {}
            Err(e) => {
                self.notice = Some(Notice::error("Error", e.to_string()));
                return;
            }
        }

        let files = library::scan(&dir, &self.settings.library);
        if files.is_empty() {
            self.notice = Some(Notice::info("Empty Playlist", "No audio files found in folder."));
            return;
        }
        let n = self.add_paths(files);
        self.notice = Some(Notice::info(
            "Loaded",
            format!("Loaded {n} songs from playlist folder."),
        ));
    }

    // --- playback actions ---

    pub fn play_selected(&mut self) {
        if !self.playlist.set_current(self.selected) {
            return;
        }
        self.load_current_track();
        self.play();
    }

    pub fn play_pause_toggle(&mut self) {
        if self.engine.is_playing() {
            self.engine.pause();
        } else if self.engine.is_paused() {
            self.engine.unpause();
        } else {
            if self.engine.loaded_path().is_none() && !self.playlist.is_empty() {
                self.playlist.set_current(0);
                self.load_current_track();
            }
            self.play();
        }
    }

    pub fn next_track(&mut self) {
        if self.playlist.next() {
            self.load_current_track();
            self.play();
        }
    }

    pub fn prev_track(&mut self) {
        if self.playlist.previous() {
            self.load_current_track();
            self.play();
        }
    }

    pub fn seek_relative(&mut self, delta: i64) {
        let result = self.engine.seek_relative(delta);
        self.report_seek(result);
    }

    /// Seek to `pct` percent of the loaded track.
    pub fn seek_percent(&mut self, pct: f64) {
        if self.engine.loaded_path().is_none() || self.engine.duration().is_zero() {
            return;
        }
        let result = self.engine.seek_percent(pct);
        self.report_seek(result);
    }

    pub fn change_volume(&mut self, delta: f32) {
        let base = if self.engine.is_muted() {
            self.engine.volume_state().volume_before_mute
        } else {
            self.engine.volume()
        };
        self.engine.set_volume(base + delta);
    }

    pub fn toggle_mute(&mut self) {
        self.engine.toggle_mute();
    }

    /// Periodic update: advance on track end and expire the download status.
    pub fn tick(&mut self, now: Instant) {
        if self.engine.loaded_path().is_some() && self.engine.is_track_ended() {
            debug!("track ended, advancing");
            self.next_track();
        }

        let dl = &mut self.search.download;
        if dl.reset_at.is_some_and(|at| now >= at) {
            *dl = DownloadStatus::default();
        }
    }

    fn play(&mut self) {
        match self.engine.play() {
            Ok(()) => info!(track = self.playlist.current_name(), "playing"),
            Err(e) => {
                warn!("playback failed: {e}");
                self.notice = Some(Notice::error(
                    "Playback error",
                    "Couldn't play file, maybe try adding some songs to the playlist",
                ));
            }
        }
    }

    fn report_seek(&mut self, result: Result<(), PlaybackError>) {
        if let Err(e) = result {
            warn!("seek failed: {e}");
            self.notice = Some(Notice::warning("Seek", "Seek not supported on this format"));
        }
    }

    /// Load the playlist's current track into the engine and queue its details.
    fn load_current_track(&mut self) {
        let Some(track) = self.playlist.current() else {
            return;
        };
        let path = track.path.clone();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| track.name.clone());

        let duration = match track.duration {
            Some(d) => d,
            None => media::probe_duration(&path),
        };

        self.now_playing = NowPlaying {
            title,
            subtitle: LOADING_SUBTITLE.to_string(),
            art: None,
            waveform: Vec::new(),
        };
        self.engine.load(&path, duration);
        if !duration.is_zero() {
            self.playlist.set_duration(&path, duration);
        }
        self.jobs.push(Job::TrackDetails(path));
    }

    fn reset_now_playing(&mut self) {
        self.now_playing = NowPlaying::empty();
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.playlist.len() {
            self.selected = self.playlist.len().saturating_sub(1);
        }
    }

    // --- add-path prompt ---

    pub fn open_prompt(&mut self) {
        self.prompt = Some(String::new());
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(p) = &mut self.prompt {
            p.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(p) = &mut self.prompt {
            p.pop();
        }
    }

    /// Add the file or folder typed into the prompt.
    pub fn submit_prompt(&mut self) {
        let Some(input) = self.prompt.take() else {
            return;
        };
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let path = expand_tilde(input);
        let files = library::collect_paths(std::slice::from_ref(&path), &self.settings.library);
        if self.add_paths(files) == 0 {
            self.notice = Some(Notice::info(
                "Nothing added",
                format!("No audio files found at:\n{}", path.display()),
            ));
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // --- search overlay ---

    pub fn open_search(&mut self) {
        self.search.open = true;
        self.search.focus = SearchFocus::Query;
    }

    pub fn close_search(&mut self) {
        self.search.open = false;
    }

    pub fn search_push_char(&mut self, c: char) {
        self.search.query.push(c);
    }

    pub fn search_pop_char(&mut self) {
        self.search.query.pop();
    }

    pub fn toggle_search_focus(&mut self) {
        self.search.focus = match self.search.focus {
            SearchFocus::Query if !self.search.results.is_empty() => SearchFocus::Results,
            _ => SearchFocus::Query,
        };
    }

    pub fn submit_search(&mut self) {
        let query = self.search.query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.search.submitted = query.clone();
        self.search.searching = true;
        self.search.status = "Searching...".to_string();
        self.search.results.clear();
        self.search.thumbnails.clear();
        self.search.selected = 0;
        self.jobs.push(Job::Search(query));
    }

    pub fn search_select_next(&mut self) {
        if self.search.selected + 1 < self.search.results.len() {
            self.search.selected += 1;
        }
    }

    pub fn search_select_prev(&mut self) {
        self.search.selected = self.search.selected.saturating_sub(1);
    }

    /// Start downloading the highlighted search result. One at a time.
    pub fn download_selected(&mut self) {
        if self.search.download.active {
            return;
        }
        let Some(result) = self.search.results.get(self.search.selected) else {
            return;
        };
        self.jobs.push(Job::Download {
            url: result.url.clone(),
            title: result.title.clone(),
        });
        self.search.download = DownloadStatus {
            active: true,
            percent: 0.0,
            text: "Starting...".to_string(),
            reset_at: None,
        };
    }

    // --- worker results ---

    /// Apply a background result, dropping it if it no longer matches what
    /// is loaded or searched for.
    pub fn apply_worker_msg(&mut self, msg: WorkerMsg, now: Instant) {
        match msg {
            WorkerMsg::Metadata { path, meta } => {
                if !self.is_loaded(&path) {
                    debug!(path = %path.display(), "dropping stale metadata");
                    return;
                }
                if meta.duration_secs > 0 {
                    self.playlist.set_duration(&path, meta.duration());
                    if self.engine.duration().is_zero() {
                        self.engine.set_duration(meta.duration());
                    }
                }
                debug!(track = %meta.display_title(), "metadata applied");
                self.now_playing.title = meta.title;
                self.now_playing.subtitle = meta.artist;
            }
            WorkerMsg::Art { path, art } => {
                if !self.is_loaded(&path) {
                    debug!(path = %path.display(), "dropping stale album art");
                    return;
                }
                self.now_playing.art = Some(art);
            }
            WorkerMsg::Waveform { path, heights } => {
                if !self.is_loaded(&path) {
                    debug!(path = %path.display(), "dropping stale waveform");
                    return;
                }
                self.now_playing.waveform = heights;
            }
            WorkerMsg::SearchResults { query, results } => {
                if query != self.search.submitted {
                    debug!(query = %query, "dropping stale search results");
                    return;
                }
                self.search.searching = false;
                match results {
                    Ok(results) if results.is_empty() => {
                        self.search.status = "No results found".to_string();
                    }
                    Ok(results) => {
                        self.search.status = format!("Found {} results", results.len());
                        for (index, r) in results.iter().enumerate() {
                            if !r.thumbnail.is_empty() {
                                self.jobs.push(Job::Thumbnail {
                                    query: query.clone(),
                                    index,
                                    url: r.thumbnail.clone(),
                                });
                            }
                        }
                        self.search.results = results;
                        self.search.selected = 0;
                    }
                    Err(e) => {
                        self.search.status = format!("Search failed: {}", truncate(&e, ERROR_PREVIEW_CHARS));
                    }
                }
            }
            WorkerMsg::Thumbnail { query, index, image } => {
                if query != self.search.submitted || index >= self.search.results.len() {
                    debug!(query = %query, index, "dropping stale thumbnail");
                    return;
                }
                self.search.thumbnails.insert(index, image);
            }
            WorkerMsg::Download(event) => self.on_download_event(event, now),
        }
    }

    fn on_download_event(&mut self, event: DownloadEvent, now: Instant) {
        match event {
            DownloadEvent::Progress { percent, status } => {
                let dl = &mut self.search.download;
                dl.percent = percent;
                dl.text = status;
            }
            DownloadEvent::Finished(Ok(path)) => {
                self.search.download = DownloadStatus {
                    active: false,
                    percent: 100.0,
                    text: "✓ Download complete!".to_string(),
                    reset_at: Some(now + DOWNLOAD_OK_RESET),
                };
                self.on_download_finished(path);
            }
            DownloadEvent::Finished(Err(e)) => {
                self.search.download = DownloadStatus {
                    active: false,
                    percent: 0.0,
                    text: format!("✗ Error: {}", truncate(&e, ERROR_PREVIEW_CHARS)),
                    reset_at: Some(now + DOWNLOAD_ERR_RESET),
                };
            }
        }
    }

    /// A finished download joins the playlist; it is loaded if it is the only track.
    pub fn on_download_finished(&mut self, path: PathBuf) {
        self.playlist.add(path);
        if self.playlist.len() == 1 {
            self.load_current_track();
        }
    }

    fn is_loaded(&self, path: &Path) -> bool {
        self.engine.loaded_path() == Some(path)
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn expand_tilde(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}
