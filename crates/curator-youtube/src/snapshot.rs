//! Raw response dumps for debugging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use curator_core::Result;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const PLAYLIST_ITEMS_FILE: &str = "playlist_items.json";
pub const VIDEO_DETAILS_FILE: &str = "video_details.json";

/// Writes raw playlist items and video details as indented JSON.
///
/// Video details arrive in chunks; they accumulate until the next playlist
/// listing starts a new snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    details: Arc<Mutex<Vec<Value>>>,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            details: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace the playlist items dump and forget previous details.
    pub fn write_playlist_items<T: Serialize>(&self, items: &[T]) -> Result<PathBuf> {
        self.details.lock().clear();
        self.write(PLAYLIST_ITEMS_FILE, &items)
    }

    /// Add a chunk of video details to the dump.
    pub fn append_video_details<T: Serialize>(&self, videos: &[T]) -> Result<PathBuf> {
        let all = {
            let mut details = self.details.lock();
            for video in videos {
                details.push(serde_json::to_value(video)?);
            }
            details.clone()
        };
        self.write(VIDEO_DETAILS_FILE, &all)
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
