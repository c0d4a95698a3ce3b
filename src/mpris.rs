use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::audio::PlaybackState;

const BUS_NAME: &str = "org.mpris.MediaPlayer2.casanova";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Commands desktop media controls send into the event loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
}

/// What the event loop last published for the loaded track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub path: std::path::PathBuf,
    pub duration: Duration,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Publish the loaded track, or clear metadata with `None`.
    pub fn set_track(&self, track: Option<&TrackInfo>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match track {
            Some(t) => {
                s.title = Some(t.title.clone());
                s.artist = Some(t.artist.clone()).filter(|a| !a.is_empty());
                s.url = Some(file_url(&t.path));
                s.length_micros = (!t.duration.is_zero())
                    .then(|| i64::try_from(t.duration.as_micros()).unwrap_or(i64::MAX));
                s.track_id = ObjectPath::try_from(format!("{OBJECT_PATH}/track/{}", t.index))
                    .ok()
                    .map(OwnedObjectPath::from);
            }
            None => {
                s.title = None;
                s.artist = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "Casanova"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        ["audio/mpeg", "audio/wav", "audio/flac", "audio/ogg", "audio/mp4", "audio/aac"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        s.playback.label()
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = s.track_id.clone().and_then(|p| owned(Value::from(p.into_inner()))) {
            map.insert("mpris:trackid".to_string(), id);
        }
        if let Some(title) = s.title.clone().and_then(|t| owned(Value::from(t))) {
            map.insert("xesam:title".to_string(), title);
        }
        if let Some(artist) = s.artist.clone().and_then(|a| owned(Value::from(vec![a]))) {
            map.insert("xesam:artist".to_string(), artist);
        }
        if let Some(url) = s.url.clone().and_then(|u| owned(Value::from(u))) {
            map.insert("xesam:url".to_string(), url);
        }
        if let Some(len) = s.length_micros.and_then(|l| owned(Value::from(l))) {
            map.insert("mpris:length".to_string(), len);
        }
        map
    }
}

/// Serve MPRIS on the session bus from a background thread.
///
/// Without a session bus the player still works; the failure is logged.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }
            info!(name = BUS_NAME, "MPRIS service registered");

            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
