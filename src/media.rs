//! Per-track extras read off the audio file: tags, cover art and the
//! waveform overview. Everything here runs on worker threads.

pub mod art;
pub mod metadata;
pub mod waveform;

pub use art::load_album_art;
pub use metadata::{TrackMetadata, probe_duration, read_metadata};
pub use waveform::compute_waveform;
