//! Background threads for the jobs the app queues.
//!
//! Every worker reports back through the event loop's channel; a closed
//! channel means the player is shutting down and results are discarded.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::app::{Job, SEARCH_THUMB_HEIGHT, SEARCH_THUMB_WIDTH, WorkerMsg};
use crate::config::Settings;
use crate::download::{self, DownloadEvent};
use crate::library;
use crate::media;

pub fn spawn_job(job: Job, settings: &Settings, tx: Sender<WorkerMsg>) {
    match job {
        Job::TrackDetails(path) => spawn_track_details(path, settings, tx),
        Job::Search(query) => spawn_search(query, settings, tx),
        Job::Thumbnail { query, index, url } => spawn_thumbnail(query, index, url, tx),
        Job::Download { url, title } => spawn_download(url, title, settings, tx),
    }
}

/// Metadata first since it is cheap, then art, then the waveform.
fn spawn_track_details(path: PathBuf, settings: &Settings, tx: Sender<WorkerMsg>) {
    let ui = settings.ui.clone();
    thread::spawn(move || {
        let meta = media::read_metadata(&path);
        if tx
            .send(WorkerMsg::Metadata {
                path: path.clone(),
                meta,
            })
            .is_err()
        {
            return;
        }

        if ui.show_art {
            let art = media::load_album_art(&path, ui.art_width, ui.art_height);
            let _ = tx.send(WorkerMsg::Art {
                path: path.clone(),
                art,
            });
        }

        let heights = media::compute_waveform(&path, ui.waveform_width, ui.waveform_height)
            .unwrap_or_else(|e| {
                debug!(path = %path.display(), "no waveform: {e}");
                Vec::new()
            });
        let _ = tx.send(WorkerMsg::Waveform { path, heights });
    });
}

fn spawn_search(query: String, settings: &Settings, tx: Sender<WorkerMsg>) {
    let download = settings.download.clone();
    thread::spawn(move || {
        let results = download::search(&download, &query).map_err(|e| {
            warn!(query = %query, "search failed: {e}");
            e.to_string()
        });
        let _ = tx.send(WorkerMsg::SearchResults { query, results });
    });
}

/// A preview that fails to load is skipped; the overlay keeps its placeholder.
fn spawn_thumbnail(query: String, index: usize, url: String, tx: Sender<WorkerMsg>) {
    thread::spawn(move || {
        let image = download::fetch_thumbnail(&url)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                media::art::scale_image(&raw, SEARCH_THUMB_WIDTH, SEARCH_THUMB_HEIGHT)
                    .map_err(|e| e.to_string())
            });
        match image {
            Ok(image) => {
                let _ = tx.send(WorkerMsg::Thumbnail { query, index, image });
            }
            Err(e) => debug!(url = %url, "no thumbnail: {e}"),
        }
    });
}

fn spawn_download(url: String, title: String, settings: &Settings, tx: Sender<WorkerMsg>) {
    let folder = match library::playlist_dir(&settings.library) {
        Ok(folder) => folder,
        Err(e) => {
            let _ = tx.send(WorkerMsg::Download(DownloadEvent::Finished(Err(e.to_string()))));
            return;
        }
    };
    download::spawn_download(settings.download.clone(), folder, url, title, move |ev| {
        let _ = tx.send(WorkerMsg::Download(ev));
    });
}
