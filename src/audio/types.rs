//! Small state types shared by the playback engine and the UI.

/// Transport state of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is sounding. Elapsed time reads as zero.
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
        }
    }
}

/// Output volume plus the level to restore when unmuting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VolumeState {
    /// Current volume in `[0.0, 1.0]`.
    pub volume: f32,
    pub muted: bool,
    /// Baseline restored by `toggle_mute`.
    pub volume_before_mute: f32,
}

impl VolumeState {
    pub fn new(volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            volume,
            muted: false,
            volume_before_mute: volume,
        }
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::new(0.7)
    }
}
