//! Playlist collaborator: track model, playlist CRUD and file import.
//!
//! Tracks come from files and directories on disk (`scan`, `import_file`)
//! and live in a `Playlist` that hands out unique ids.

mod display;
mod model;
mod playlist;
mod scan;

pub use display::{format_clock, format_duration};
pub use model::{NewTrack, Track, TrackId};
pub use playlist::Playlist;
pub use scan::import_paths;
