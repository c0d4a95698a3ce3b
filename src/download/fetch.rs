use std::ffi::OsString;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::thread::{self, JoinHandle};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::process::{stderr_reason, tool_command};
use super::tags::{find_thumbnail, write_download_tags};
use super::thumbnail::cover_bytes;
use crate::config::DownloadSettings;
use crate::error::DownloadError;

/// Progress reported by a running download.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress { percent: f32, status: String },
    /// Final file path, or a message describing why it failed.
    Finished(Result<PathBuf, String>),
}

/// The subset of `yt-dlp -J` output used for tagging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    pub webpage_url: Option<String>,
    pub thumbnail: Option<String>,
}

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_NAME_CHARS: usize = 100;

/// Strip characters that are invalid in file names, collapse whitespace
/// and cap the length.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| !INVALID_CHARS.contains(c)).collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}

/// Map one line of `yt-dlp --newline` output to a progress update.
pub fn parse_progress_line(line: &str) -> Option<(f32, &'static str)> {
    let line = line.trim();
    if line.starts_with("[ExtractAudio]") {
        return Some((90.0, "Converting to MP3..."));
    }
    let rest = line.strip_prefix("[download]")?;
    let pct = rest.split_whitespace().next()?.strip_suffix('%')?;
    let pct: f32 = pct.parse().ok()?;
    Some((pct.clamp(0.0, 100.0), "Downloading..."))
}

pub fn fetch_info(settings: &DownloadSettings, url: &str) -> Result<VideoInfo, DownloadError> {
    let output = tool_command(&settings.ytdlp_path)
        .args(["-J", "--no-playlist", "--no-warnings", url])
        .output()
        .map_err(DownloadError::Spawn)?;
    if !output.status.success() {
        return Err(DownloadError::ToolFailed(stderr_reason(&output.stderr)));
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

fn download_args(settings: &DownloadSettings, url: &str, base: &Path) -> Vec<OsString> {
    let mut template = base.as_os_str().to_owned();
    template.push(".%(ext)s");

    let mut args: Vec<OsString> = [
        "-x",
        "--audio-format",
        settings.audio_format.as_str(),
        "--audio-quality",
        settings.audio_quality.as_str(),
        "--write-thumbnail",
        "--convert-thumbnails",
        "jpg",
        "--no-playlist",
        "--newline",
        "-o",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(template);
    if let Some(ffmpeg) = &settings.ffmpeg_location {
        args.push("--ffmpeg-location".into());
        args.push(ffmpeg.as_os_str().to_owned());
    }
    args.push(url.into());
    args
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Download `url` as audio into `folder` on a background thread.
///
/// `on_event` receives progress updates and exactly one `Finished`.
pub fn spawn_download<F>(
    settings: DownloadSettings,
    folder: PathBuf,
    url: String,
    title: String,
    on_event: F,
) -> JoinHandle<()>
where
    F: Fn(DownloadEvent) + Send + 'static,
{
    thread::spawn(move || {
        let result = run_download(&settings, &folder, &url, &title, &on_event);
        match &result {
            Ok(path) => info!(path = %path.display(), "download complete"),
            Err(e) => warn!(url = %url, "download failed: {e}"),
        }
        on_event(DownloadEvent::Finished(result.map_err(|e| e.to_string())));
    })
}

fn run_download(
    settings: &DownloadSettings,
    folder: &Path,
    url: &str,
    title: &str,
    on_event: &dyn Fn(DownloadEvent),
) -> Result<PathBuf, DownloadError> {
    let progress = |percent: f32, status: &str| {
        on_event(DownloadEvent::Progress {
            percent,
            status: status.to_string(),
        })
    };

    fs::create_dir_all(folder)?;
    let mut name = sanitize_filename(title);
    if name.is_empty() {
        name = "download".to_string();
    }
    let base = folder.join(&name);

    let info = match fetch_info(settings, url) {
        Ok(info) => info,
        Err(e) => {
            // tags are optional, the download itself may still work
            warn!("could not fetch video info: {e}");
            VideoInfo::default()
        }
    };

    let mut child = tool_command(&settings.ytdlp_path)
        .args(download_args(settings, url, &base))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(DownloadError::Spawn)?;

    let stderr = child.stderr.take();
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut s) = stderr {
            let _ = s.read_to_end(&mut buf);
        }
        buf
    });

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if let Some((pct, status)) = parse_progress_line(&line) {
                progress(pct, status);
            }
        }
    }

    let status = child.wait()?;
    let stderr = stderr_reader.join().unwrap_or_default();
    if !status.success() {
        return Err(DownloadError::ToolFailed(stderr_reason(&stderr)));
    }

    let final_path = with_suffix(&base, &settings.audio_format);
    if !final_path.exists() {
        if base.exists() {
            debug!("downloader left no extension, renaming");
            fs::rename(&base, &final_path)?;
        } else {
            return Err(DownloadError::NotFound(final_path));
        }
    }

    progress(95.0, "Adding metadata...");
    let thumbnail = find_thumbnail(&base);
    let cover = cover_bytes(thumbnail.as_deref(), info.thumbnail.as_deref());
    if let Err(e) = write_download_tags(&final_path, &info, cover.as_deref(), settings) {
        warn!(path = %final_path.display(), "could not write tags: {e}");
    }
    if let Some(thumb) = thumbnail {
        if let Err(e) = fs::remove_file(&thumb) {
            debug!(path = %thumb.display(), "could not remove thumbnail: {e}");
        }
    }

    progress(100.0, "Complete!");
    Ok(final_path)
}
