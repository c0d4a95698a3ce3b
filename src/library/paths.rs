use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::LibrarySettings;
use crate::error::LibraryError;

/// The playlist folder: `library.playlist_dir` or `~/Music/playlist`.
///
/// Downloads land here too.
pub fn playlist_dir(settings: &LibrarySettings) -> Result<PathBuf, LibraryError> {
    if let Some(dir) = &settings.playlist_dir {
        return Ok(dir.clone());
    }
    dirs::home_dir()
        .map(|home| home.join("Music").join("playlist"))
        .ok_or(LibraryError::NoHomeDir)
}

/// Create `dir` if missing. Returns true when it was created.
pub fn ensure_folder(dir: &Path) -> Result<bool, LibraryError> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|source| LibraryError::CreateFolder {
        path: dir.to_path_buf(),
        source,
    })?;
    info!(path = %dir.display(), "created playlist folder");
    Ok(true)
}
