//! Shared helpers for unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{AudioBackend, ManualClock, PlaybackEngine};
use crate::error::PlaybackError;

/// What a `FakeBackend` has been asked to do.
#[derive(Debug, Default)]
pub struct FakeState {
    pub playing: Option<(PathBuf, Duration)>,
    pub paused: bool,
    pub volume: f32,
    pub stops: usize,
    pub fail_play: bool,
    pub fail_seek: bool,
}

/// In-memory backend whose state stays observable after it is boxed.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new(volume: f32) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().volume = volume;
        fake
    }
}

impl AudioBackend for FakeBackend {
    fn play_from(&mut self, path: &Path, start: Duration) -> Result<(), PlaybackError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_play {
            return Err(PlaybackError::Decode {
                path: path.to_path_buf(),
                reason: "fake decode failure".to_string(),
            });
        }
        if s.fail_seek && !start.is_zero() {
            return Err(PlaybackError::Seek("fake format".to_string()));
        }
        s.playing = Some((path.to_path_buf(), start));
        s.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().paused = true;
    }

    fn resume(&mut self) {
        self.state.lock().unwrap().paused = false;
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        let mut s = self.state.lock().unwrap();
        s.playing = None;
        s.stops += 1;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }
}

/// Engine wired to a fake backend and a manual clock.
pub fn fake_engine() -> (PlaybackEngine, FakeBackend, Arc<ManualClock>) {
    let backend = FakeBackend::new(0.7);
    let clock = Arc::new(ManualClock::new());
    let engine = PlaybackEngine::new(Box::new(backend.clone()), clock.clone());
    (engine, backend, clock)
}

/// Write a mono 16-bit PCM WAV holding `samples`.
pub fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    let data_len = (samples.len() * 2) as u32;
    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        buf.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, buf).unwrap();
}

/// A one-second 440 Hz tone at 8 kHz.
pub fn write_tone_wav(path: &Path) {
    let rate = 8000u32;
    let samples: Vec<i16> = (0..rate)
        .map(|i| {
            let t = i as f32 / rate as f32;
            ((t * 440.0 * std::f32::consts::TAU).sin() * 12_000.0) as i16
        })
        .collect();
    write_wav(path, rate, &samples);
}
