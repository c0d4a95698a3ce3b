use super::*;
use std::path::PathBuf;
use std::sync::mpsc;

fn make_track() -> TrackInfo {
    TrackInfo {
        index: 3,
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        path: PathBuf::from("/tmp/music/test.mp3"),
        duration: Duration::from_micros(1_234_567),
    }
}

#[test]
fn set_track_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    handle.set_track(Some(&make_track()));
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist.as_deref(), Some("Test Artist"));
        assert_eq!(s.url.as_deref(), Some("file:///tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/3")
        );
    }

    handle.set_track(None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.artist, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn unknown_duration_and_artist_are_omitted() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };
    handle.set_track(Some(&TrackInfo {
        artist: String::new(),
        duration: Duration::ZERO,
        ..make_track()
    }));

    let s = state.lock().unwrap();
    assert_eq!(s.artist, None);
    assert_eq!(s.length_micros, None);
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().playback = PlaybackState::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().playback = PlaybackState::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    assert!(iface.metadata().is_empty());

    MprisHandle {
        state: state.clone(),
    }
    .set_track(Some(&make_track()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn player_methods_forward_commands() {
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: Arc::new(Mutex::new(SharedState::default())),
    };
    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}
