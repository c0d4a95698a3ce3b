//! The playlist folder on disk and helpers to find audio files in it.

mod paths;
mod scan;

pub use paths::{ensure_folder, playlist_dir};
pub use scan::{collect_paths, is_audio_file, scan};

#[cfg(test)]
mod tests;
