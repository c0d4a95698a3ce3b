use std::path::PathBuf;

use super::{ensure_folder, playlist_dir};
use crate::config::LibrarySettings;

#[test]
fn configured_playlist_dir_wins() {
    let settings = LibrarySettings {
        playlist_dir: Some(PathBuf::from("/srv/tunes")),
        ..LibrarySettings::default()
    };
    assert_eq!(playlist_dir(&settings).unwrap(), PathBuf::from("/srv/tunes"));
}

#[test]
fn default_playlist_dir_lives_under_music() {
    if let Ok(dir) = playlist_dir(&LibrarySettings::default()) {
        assert!(dir.ends_with("Music/playlist"));
    }
}

#[test]
fn ensure_folder_creates_once() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("Music").join("playlist");

    assert!(ensure_folder(&dir).unwrap());
    assert!(dir.is_dir());
    assert!(!ensure_folder(&dir).unwrap());
}

#[test]
fn ensure_folder_reports_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();

    let err = ensure_folder(&blocker.join("sub")).unwrap_err();
    assert!(err.to_string().contains("could not create folder"));
}
