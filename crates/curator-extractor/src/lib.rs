//! # curator-extractor
//!
//! Local backups of playlist videos using yt-dlp.
//!
//! Features:
//! - Skips videos already present in the backup folder
//! - Audio-only backups split by chapter, without the unsplit original
//! - Playlist folders follow playlist renames

pub mod backup;
pub mod layout;

use std::path::{Path, PathBuf};

use curator_core::{Error, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::layout::{is_downloaded, is_valid_video_id, remove_unsplit_originals, SEPARATOR};

pub use backup::{backup_playlist, BackupOptions, BackupReport};

/// Longest file name yt-dlp may produce.
const TRIM_FILENAMES: &str = "250";

/// What a download call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A file for the video was already in the folder.
    AlreadyPresent,
    Downloaded,
    /// Downloaded and split into a chapter folder.
    SplitByChapters,
}

/// Runs yt-dlp to back up single videos.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct Extractor {
    yt_dlp_path: PathBuf,
}

impl Extractor {
    /// Use a yt-dlp binary from the cache directory if present, else `yt-dlp` on `PATH`.
    pub fn new() -> Self {
        let yt_dlp_path = directories::ProjectDirs::from("", "", "curator")
            .map(|d| d.cache_dir().join("yt-dlp"))
            .filter(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from("yt-dlp"));

        Self { yt_dlp_path }
    }

    #[must_use]
    pub fn with_yt_dlp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.yt_dlp_path = path.into();
        self
    }

    pub fn yt_dlp_path(&self) -> &Path {
        &self.yt_dlp_path
    }

    /// yt-dlp arguments for one video.
    ///
    /// `index` is the 1-based playlist position prefixed to the file name.
    pub fn download_args(video_id: &str, index: Option<usize>, audio_only: bool) -> Vec<String> {
        let prefix = index.map(|i| format!("{i:02}{SEPARATOR}")).unwrap_or_default();
        let name = format!("{prefix}%(id)s{SEPARATOR}%(uploader).100B{SEPARATOR}%(title).200B");

        let mut args: Vec<String> = vec![
            format!("https://www.youtube.com/watch?v={video_id}"),
            "--abort-on-error".into(),
            "--embed-metadata".into(),
            "--trim-filenames".into(),
            TRIM_FILENAMES.into(),
        ];

        if audio_only {
            args.extend([
                "-x".into(),
                "--split-chapters".into(),
                "-o".into(),
                format!("{name}.%(ext)s"),
                "-o".into(),
                format!("chapter:{name}/%(section_number).02d. %(section_title).200B.%(ext)s"),
            ]);
        } else {
            // Thumbnails can't be embedded when splitting audio by chapter, so only video gets them.
            args.extend([
                "--compat-options".into(),
                "no-keep-subs".into(),
                "--embed-info-json".into(),
                "--embed-thumbnail".into(),
                "--embed-subs".into(),
                "--write-subs".into(),
                "--write-auto-subs".into(),
                "--sub-lang".into(),
                "en.*,en,en-US".into(),
                "-S".into(),
                "res:720".into(),
                "--merge-output-format".into(),
                "mkv".into(),
                "-o".into(),
                format!("{name}.%(ext)s"),
            ]);
        }

        args
    }

    /// Download one video into `dest`, unless it is already there.
    pub async fn download(
        &self,
        video_id: &str,
        dest: &Path,
        index: Option<usize>,
        audio_only: bool,
    ) -> Result<DownloadOutcome> {
        if !is_valid_video_id(video_id) {
            return Err(Error::InvalidArgument(format!("Invalid video id '{video_id}'")));
        }

        if is_downloaded(dest, video_id)? {
            debug!("Video '{video_id}' is already downloaded");
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        info!("Downloading video '{video_id}'");
        let args = Self::download_args(video_id, index, audio_only);

        let output = Command::new(&self.yt_dlp_path)
            .args(&args)
            .current_dir(dest)
            .output()
            .await
            .map_err(|e| {
                Error::Download(format!(
                    "Failed to run {}: {e}",
                    self.yt_dlp_path.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp stderr: {stderr}");
            return Err(Error::Download(format!(
                "yt-dlp failed for '{video_id}': {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
        }

        // yt-dlp keeps the unsplit file next to the chapter folder.
        let removed = remove_unsplit_originals(dest, video_id)?;
        if removed > 0 {
            debug!("Video '{video_id}' has been split by chapters");
            return Ok(DownloadOutcome::SplitByChapters);
        }

        Ok(DownloadOutcome::Downloaded)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
