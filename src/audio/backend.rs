//! The audio output seam.
//!
//! `PlaybackEngine` only talks to this trait, so its timing logic can be
//! exercised without a sound card. `RodioBackend` is the real mixer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info};

use crate::error::PlaybackError;

pub trait AudioBackend {
    /// Replace whatever is playing with `path`, starting at `start`.
    ///
    /// On error the previously playing audio, if any, keeps going.
    fn play_from(&mut self, path: &Path, start: Duration) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
}

/// `rodio` mixer with a single sink.
///
/// The output stream is opened on first playback so the player can start
/// (and browse playlists) on machines without an audio device.
pub struct RodioBackend {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioBackend {
    pub fn new(volume: f32) -> Self {
        Self {
            stream: None,
            sink: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn stream(&mut self) -> Result<&OutputStream, PlaybackError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| PlaybackError::OutputDevice(e.to_string()))?;
            // rodio prints to stderr on drop, which would tear the TUI.
            stream.log_on_drop(false);
            info!("opened default audio output stream");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| PlaybackError::OutputDevice("stream unavailable".to_string()))
    }
}

impl AudioBackend for RodioBackend {
    fn play_from(&mut self, path: &Path, start: Duration) -> Result<(), PlaybackError> {
        let mut source = decode(path)?;
        if !start.is_zero() {
            source
                .try_seek(start)
                .map_err(|e| PlaybackError::Seek(e.to_string()))?;
        }

        let volume = self.volume;
        let sink = Sink::connect_new(self.stream()?.mixer());
        sink.set_volume(volume);
        sink.append(source);
        sink.play();

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        debug!(path = %path.display(), start_secs = start.as_secs(), "sink started");
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

/// Open a seekable decoder for `path`, hinting the container by extension.
pub(crate) fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    let mut builder = Decoder::builder()
        .with_data(BufReader::new(file))
        .with_byte_len(len)
        .with_seekable(true);

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let hint = match ext.to_ascii_lowercase().as_str() {
            "m4a" | "m4b" | "mp4" => "audio/mp4".to_string(),
            "oga" | "opus" => "audio/ogg".to_string(),
            "wave" => "wav".to_string(),
            other => other.to_string(),
        };
        builder = builder.with_hint(&hint);
    }

    builder.build().map_err(|e| PlaybackError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
