//! Typed wrappers around the Data API resources the curator uses.

pub mod playlist_items;
pub mod playlists;
pub mod videos;

/// Largest page size the API accepts.
pub const MAX_RESULTS: &str = "50";
