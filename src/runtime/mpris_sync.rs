use crate::app::{App, LOADING_SUBTITLE};
use crate::audio::PlaybackState;
use crate::media::metadata::UNKNOWN_ARTIST;
use crate::mpris::{MprisHandle, TrackInfo};

type Snapshot = (Option<TrackInfo>, PlaybackState);

/// Pushes app state to MPRIS only when it changed since the last push.
#[derive(Default)]
pub struct MprisSync {
    last: Option<Snapshot>,
}

impl MprisSync {
    pub fn update(&mut self, mpris: &MprisHandle, app: &App) {
        let snap = snapshot(app);
        if self.last.as_ref() == Some(&snap) {
            return;
        }
        mpris.set_track(snap.0.as_ref());
        mpris.set_playback(snap.1);
        self.last = Some(snap);
    }
}

fn snapshot(app: &App) -> Snapshot {
    let track = app.engine.loaded_path().map(|path| {
        let np = &app.now_playing;
        let artist = if np.subtitle == LOADING_SUBTITLE || np.subtitle == UNKNOWN_ARTIST {
            String::new()
        } else {
            np.subtitle.clone()
        };
        TrackInfo {
            index: app.playing_index().unwrap_or(0),
            title: np.title.clone(),
            artist,
            path: path.to_path_buf(),
            duration: app.engine.duration(),
        }
    });
    (track, app.engine.state())
}
