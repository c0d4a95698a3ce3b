//! YouTube search and download-to-playlist, driven through `yt-dlp`.
//!
//! Everything here blocks; callers run it on worker threads.

mod fetch;
mod process;
mod search;
mod tags;
mod thumbnail;

pub use fetch::{DownloadEvent, VideoInfo, fetch_info, parse_progress_line, sanitize_filename, spawn_download};
pub use process::tool_command;
pub use search::{SearchResult, format_duration, parse_search_json, search};
pub use tags::{find_thumbnail, prepare_cover_jpeg, write_download_tags};
pub use thumbnail::{cover_bytes, fetch_thumbnail};
