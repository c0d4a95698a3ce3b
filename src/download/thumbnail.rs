use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::DownloadError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn http_client() -> Result<Client, DownloadError> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Fetch a thumbnail image over HTTP. Blocks; run it on a worker thread.
pub fn fetch_thumbnail(url: &str) -> Result<Vec<u8>, DownloadError> {
    debug!(url, "fetching thumbnail");
    let response = http_client()?.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    debug!(url, len = bytes.len(), "thumbnail fetched");
    Ok(bytes.to_vec())
}

/// Raw cover image for a download: the thumbnail file `yt-dlp` wrote, or
/// the video's thumbnail URL when no file was left behind.
pub fn cover_bytes(local: Option<&Path>, url: Option<&str>) -> Option<Vec<u8>> {
    if let Some(path) = local {
        match fs::read(path) {
            Ok(bytes) => return Some(bytes),
            Err(e) => debug!(path = %path.display(), "could not read thumbnail: {e}"),
        }
    }

    let url = url.filter(|u| !u.is_empty())?;
    match fetch_thumbnail(url) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!(url, "no cover: {e}");
            None
        }
    }
}
