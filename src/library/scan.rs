use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Audio files under `dir`, sorted by path (case-insensitive).
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    // Non-recursive = only the root directory.
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_audio_file(p, settings))
        .collect();

    files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    files
}

/// Expand user-supplied paths: audio files are taken as is, folders are
/// scanned. Anything else is dropped.
pub fn collect_paths(inputs: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            out.extend(scan(input, settings));
        } else if input.is_file() && is_audio_file(input, settings) {
            out.push(absolute(input));
        } else {
            tracing::warn!(path = %input.display(), "skipping: not an audio file or folder");
        }
    }
    out
}

fn absolute(p: &Path) -> PathBuf {
    std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
}
