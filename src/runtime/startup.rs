use std::path::PathBuf;

use tracing::info;

use crate::app::{App, Notice};
use crate::library;

/// Fill the playlist before the first frame: paths from the command line,
/// otherwise the playlist folder when autoload is on.
pub fn populate_playlist(app: &mut App, cli_paths: &[PathBuf]) {
    if !cli_paths.is_empty() {
        let files = library::collect_paths(cli_paths, &app.settings.library);
        let added = app.add_paths(files);
        info!(added, "loaded tracks from command line");
        if added == 0 {
            app.notice = Some(Notice::warning(
                "Nothing added",
                "No audio files found in the given paths.",
            ));
        }
        return;
    }

    if app.settings.library.autoload {
        app.load_default_folder();
    }
}
