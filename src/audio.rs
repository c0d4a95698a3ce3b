//! Audio playback.
//!
//! `PlaybackEngine` is the state machine the rest of the player drives;
//! `RodioBackend` produces the sound.

mod backend;
mod clock;
mod engine;
mod types;

pub use backend::{AudioBackend, RodioBackend};
pub(crate) use backend::decode;
pub use clock::{Clock, SystemClock};
pub use engine::PlaybackEngine;
pub use types::{PlaybackState, VolumeState};

#[cfg(test)]
pub use clock::ManualClock;
