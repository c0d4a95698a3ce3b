//! In-memory playlist: ordered tracks plus the cursor that picks the
//! current one.

mod model;

pub use model::*;
