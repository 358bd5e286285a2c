//! Whole-playlist backups.

use std::path::PathBuf;

use curator_core::availability::apply_details;
use curator_core::curate::fetch_details;
use curator_core::{Error, OrderedCollection, Result, SongHasher};
use serde::Serialize;
use tracing::{info, warn};

use crate::layout::{adopt_previous_folder, is_valid_playlist_id, playlist_folder};
use crate::{DownloadOutcome, Extractor};

#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub collection_id: String,
    /// Folder holding one sub-folder per backed-up playlist.
    pub dest: PathBuf,
    pub region: Option<String>,
    pub audio_only: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupReport {
    pub folder: PathBuf,
    pub downloaded: Vec<String>,
    pub already_present: Vec<String>,
    pub skipped_unavailable: Vec<String>,
    pub skipped_auto_generated: Vec<String>,
    /// Video IDs whose download failed, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Download every available video of a playlist into its backup folder.
///
/// Unavailable videos and auto-generated uploads are skipped. A failed
/// download is logged and the backup continues.
pub async fn backup_playlist<S>(
    service: &S,
    extractor: &Extractor,
    hasher: &SongHasher,
    options: &BackupOptions,
) -> Result<BackupReport>
where
    S: OrderedCollection + ?Sized,
{
    let id = options.collection_id.as_str();
    if !is_valid_playlist_id(id) {
        return Err(Error::InvalidArgument(format!("Invalid playlist id '{id}'")));
    }

    let collection = service.describe(id).await?;
    info!("Backing up playlist '{id}' ({})", collection.title);

    let folder = playlist_folder(&collection.title, id);
    tokio::fs::create_dir_all(&options.dest).await?;
    if adopt_previous_folder(&options.dest, &folder, id)? {
        info!("Renamed previous backup folder to '{folder}'");
    }
    let dir = options.dest.join(&folder);
    tokio::fs::create_dir_all(&dir).await?;

    let mut entries = service.list_all(id).await?;
    let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
    let details = fetch_details(service, &ids).await?;
    apply_details(&mut entries, &details, options.region.as_deref());

    let mut report = BackupReport {
        folder: dir.clone(),
        ..BackupReport::default()
    };

    for entry in &entries {
        if !entry.is_available {
            info!("Skipping unavailable video '{}' ({})", entry.id, entry.title);
            report.skipped_unavailable.push(entry.id.clone());
            continue;
        }
        if hasher.is_auto_generated(entry) {
            report.skipped_auto_generated.push(entry.id.clone());
            continue;
        }

        match extractor
            .download(&entry.id, &dir, Some(entry.position + 1), options.audio_only)
            .await
        {
            Ok(DownloadOutcome::AlreadyPresent) => report.already_present.push(entry.id.clone()),
            Ok(_) => report.downloaded.push(entry.id.clone()),
            Err(e) => {
                warn!("Could not download video '{}' ({}): {e}", entry.id, entry.title);
                report.failed.push((entry.id.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Backup of '{id}' done: {} downloaded, {} already present, {} failed",
        report.downloaded.len(),
        report.already_present.len(),
        report.failed.len()
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use curator_core::hash::AUTO_GENERATED_MARKER;
    use curator_core::{CollectionInfo, DetailRecord, Entry, MoveRequest};

    use super::*;

    struct FixedPlaylist {
        title: String,
        entries: Vec<Entry>,
    }

    #[async_trait]
    impl OrderedCollection for FixedPlaylist {
        async fn describe(&self, collection_id: &str) -> Result<CollectionInfo> {
            Ok(CollectionInfo {
                id: collection_id.to_string(),
                title: self.title.clone(),
                ..CollectionInfo::default()
            })
        }

        async fn list_all(&self, _collection_id: &str) -> Result<Vec<Entry>> {
            Ok(self.entries.clone())
        }

        async fn list_details(&self, _ids: &[String]) -> Result<Vec<DetailRecord>> {
            Ok(Vec::new())
        }

        async fn move_item(&self, _request: &MoveRequest) -> Result<()> {
            Err(Error::InvalidArgument("read-only".into()))
        }

        async fn delete(&self, _membership_id: &str) -> Result<()> {
            Err(Error::InvalidArgument("read-only".into()))
        }
    }

    #[tokio::test]
    async fn test_backup_skips_and_continues() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir(dest.path().join("Old Title | PL123")).unwrap();
        std::fs::write(
            dest.path()
                .join("Old Title | PL123")
                .join("01 | aaaaaaaaaaa | Someone | Song.mkv"),
            b"x",
        )
        .unwrap();

        let playlist = FixedPlaylist {
            title: "Metal: Classics".to_string(),
            entries: vec![
                Entry::new("aaaaaaaaaaa", "p1", "Present - Song", 0),
                Entry::new("bbbbbbbbbbb", "p2", "Private video", 1).unavailable(),
                Entry::new("ccccccccccc", "p3", "Topic Song", 2)
                    .with_description(format!("Provided to YouTube{AUTO_GENERATED_MARKER}")),
                Entry::new("ddddddddddd", "p4", "Needs - Download", 3),
            ],
        };
        let extractor = Extractor::new().with_yt_dlp_path("/nonexistent/yt-dlp");
        let options = BackupOptions {
            collection_id: "PL123".to_string(),
            dest: dest.path().to_path_buf(),
            region: None,
            audio_only: false,
        };

        let report = backup_playlist(&playlist, &extractor, &SongHasher::default(), &options)
            .await
            .unwrap();

        assert_eq!(report.folder, dest.path().join("Metal_ Classics | PL123"));
        assert!(report.folder.is_dir());
        assert_eq!(report.already_present, vec!["aaaaaaaaaaa"]);
        assert_eq!(report.skipped_unavailable, vec!["bbbbbbbbbbb"]);
        assert_eq!(report.skipped_auto_generated, vec!["ccccccccccc"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "ddddddddddd");
        assert!(report.downloaded.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_playlist_id() {
        let dest = tempfile::tempdir().unwrap();
        let playlist = FixedPlaylist {
            title: String::new(),
            entries: Vec::new(),
        };
        let options = BackupOptions {
            collection_id: "../x".to_string(),
            dest: dest.path().to_path_buf(),
            region: None,
            audio_only: true,
        };

        let err = backup_playlist(&playlist, &Extractor::new(), &SongHasher::default(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
