//! Playback state machine.
//!
//! Elapsed time is never stored. It is derived from a wall-clock anchor
//! (`start_ref`) that gets re-based on pause, resume and seek so that
//! `now - start_ref` stays equal to the playback position.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::backend::AudioBackend;
use super::clock::Clock;
use super::types::{PlaybackState, VolumeState};
use crate::error::PlaybackError;

pub struct PlaybackEngine {
    backend: Box<dyn AudioBackend>,
    clock: Arc<dyn Clock>,
    state: PlaybackState,
    path: Option<PathBuf>,
    duration: Duration,
    start_ref: Option<Instant>,
    paused_offset: Duration,
    volume: VolumeState,
}

impl PlaybackEngine {
    pub fn new(backend: Box<dyn AudioBackend>, clock: Arc<dyn Clock>) -> Self {
        let volume = VolumeState::new(backend.volume());
        Self {
            backend,
            clock,
            state: PlaybackState::Stopped,
            path: None,
            duration: Duration::ZERO,
            start_ref: None,
            paused_offset: Duration::ZERO,
            volume,
        }
    }

    /// Make `path` the loaded track. Whatever was sounding is stopped.
    pub fn load(&mut self, path: &Path, duration: Duration) {
        self.halt();
        info!(path = %path.display(), secs = duration.as_secs(), "track loaded");
        self.path = Some(path.to_path_buf());
        self.duration = duration;
    }

    /// Start the loaded track from the beginning.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let path = self.path.as_deref().ok_or(PlaybackError::NoTrackLoaded)?;
        self.backend.play_from(path, Duration::ZERO)?;
        self.state = PlaybackState::Playing;
        self.start_ref = Some(self.clock.now());
        self.paused_offset = Duration::ZERO;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.paused_offset = self.elapsed();
        self.backend.pause();
        self.state = PlaybackState::Paused;
    }

    pub fn unpause(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        self.start_ref = Some(self.anchor_for(self.paused_offset));
        self.backend.resume();
        self.state = PlaybackState::Playing;
    }

    /// Stop playback. The track stays loaded.
    pub fn stop(&mut self) {
        self.halt();
    }

    /// Jump to `secs` into the loaded track and keep playing from there.
    ///
    /// A paused or stopped engine starts playing. When the format cannot
    /// seek, state and anchor are left as they were.
    pub fn seek(&mut self, secs: u64) -> Result<(), PlaybackError> {
        let path = self.path.as_deref().ok_or(PlaybackError::NoTrackLoaded)?;
        if self.duration.is_zero() {
            return Err(PlaybackError::ZeroDuration);
        }
        let pos = Duration::from_secs(secs);
        self.backend.play_from(path, pos).map_err(|e| match e {
            e @ PlaybackError::Seek(_) => e,
            other => PlaybackError::Seek(other.to_string()),
        })?;
        self.start_ref = Some(self.anchor_for(pos));
        self.paused_offset = Duration::ZERO;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Seek to `pct` percent (clamped to `[0, 100]`) of the duration.
    pub fn seek_percent(&mut self, pct: f64) -> Result<(), PlaybackError> {
        if self.path.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        let pct = pct.clamp(0.0, 100.0);
        let target = (self.duration.as_secs() as f64 * pct / 100.0) as u64;
        self.seek(target)
    }

    /// Move by `delta` seconds, clamped to the track bounds.
    ///
    /// Does nothing when no track with a known duration is loaded.
    pub fn seek_relative(&mut self, delta: i64) -> Result<(), PlaybackError> {
        if self.path.is_none() || self.duration.is_zero() {
            return Ok(());
        }
        let total = self.duration.as_secs() as i64;
        let target = (self.elapsed_secs() as i64 + delta).clamp(0, total);
        self.seek(target as u64)
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.backend.set_volume(volume);
        self.volume.volume = volume;
        if volume > 0.0 && self.volume.muted {
            self.volume.muted = false;
        }
        self.volume.volume_before_mute = volume;
    }

    /// Flip mute and return the new flag.
    pub fn toggle_mute(&mut self) -> bool {
        if self.volume.muted {
            let restore = self.volume.volume_before_mute;
            self.backend.set_volume(restore);
            self.volume.volume = restore;
            self.volume.muted = false;
        } else {
            self.volume.volume_before_mute = self.backend.volume();
            self.backend.set_volume(0.0);
            self.volume.volume = 0.0;
            self.volume.muted = true;
        }
        self.volume.muted
    }

    pub fn elapsed(&self) -> Duration {
        match self.state {
            PlaybackState::Playing => self
                .start_ref
                .map(|start| self.clock.now().saturating_duration_since(start))
                .unwrap_or(Duration::ZERO),
            PlaybackState::Paused => self.paused_offset,
            PlaybackState::Stopped => Duration::ZERO,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// True once a playing track has run for its whole duration.
    pub fn is_track_ended(&self) -> bool {
        self.state == PlaybackState::Playing
            && !self.duration.is_zero()
            && self.elapsed_secs() >= self.duration.as_secs()
    }

    /// Force Stopped and forget the loaded track.
    pub fn reset(&mut self) {
        self.halt();
        self.path = None;
        self.duration = Duration::ZERO;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn loaded_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Update the duration of the loaded track once metadata arrives.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn volume(&self) -> f32 {
        self.volume.volume
    }

    pub fn volume_state(&self) -> VolumeState {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.volume.muted
    }

    /// Elapsed share of the duration in `[0, 100]`, 0 when unknown.
    pub fn progress_percent(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let pct = self.elapsed().as_secs_f64() / self.duration.as_secs_f64() * 100.0;
        pct.clamp(0.0, 100.0)
    }

    fn halt(&mut self) {
        if let Err(e) = self.backend.stop() {
            debug!("ignoring backend stop error: {e}");
        }
        self.state = PlaybackState::Stopped;
        self.start_ref = None;
        self.paused_offset = Duration::ZERO;
    }

    fn anchor_for(&self, offset: Duration) -> Instant {
        let now = self.clock.now();
        now.checked_sub(offset).unwrap_or_else(|| {
            warn!("clock too close to its origin to re-anchor");
            now
        })
    }
}
