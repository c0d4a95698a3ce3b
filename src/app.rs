//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and owns the playback engine, the
//! playlist and everything the UI renders.

mod model;
mod state;

pub use model::*;
pub use state::*;
