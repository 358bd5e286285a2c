//! Backup folder and file naming.
//!
//! Downloads are named `NN | id | uploader | title.ext`, so the video ID is
//! always one of the first two fields of a name.

use std::fs;
use std::path::Path;

use curator_core::{Error, Result};
use tracing::debug;

/// Field separator in backup file and folder names.
pub const SEPARATOR: &str = " | ";

/// Characters Windows refuses in file names.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `name` usable as a single path component on every platform.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();

    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Folder name for a playlist backup.
pub fn playlist_folder(title: &str, playlist_id: &str) -> String {
    format!("{}{SEPARATOR}{playlist_id}", sanitize(title))
}

/// Whether a file or folder name belongs to `video_id`.
pub fn names_video(name: &str, video_id: &str) -> bool {
    name.split(SEPARATOR).take(2).any(|field| field == video_id)
}

/// Whether `dir` already holds a download of `video_id`.
pub fn is_downloaded(dir: &Path, video_id: &str) -> Result<bool> {
    for entry in fs::read_dir(dir)? {
        if names_video(&entry?.file_name().to_string_lossy(), video_id) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// After a chapter split, delete the unsplit original files of `video_id`.
///
/// Does nothing unless a chapter folder for the video exists. Returns the
/// number of files removed.
pub fn remove_unsplit_originals(dir: &Path, video_id: &str) -> Result<usize> {
    let mut chapter_dir = false;
    let mut originals = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !names_video(&entry.file_name().to_string_lossy(), video_id) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            chapter_dir = true;
        } else {
            originals.push(entry.path());
        }
    }

    if !chapter_dir {
        return Ok(0);
    }

    for path in &originals {
        debug!("Removing unsplit original {}", path.display());
        fs::remove_file(path)?;
    }
    Ok(originals.len())
}

/// Rename an older folder of the same playlist to `folder`.
///
/// Playlist titles change; the folder is matched by its trailing ID.
pub fn adopt_previous_folder(dest: &Path, folder: &str, playlist_id: &str) -> Result<bool> {
    let suffix = format!("{SEPARATOR}{playlist_id}");

    for entry in fs::read_dir(dest)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with(&suffix) && name != folder {
            fs::rename(dest.join(&name), dest.join(folder)).map_err(|e| {
                Error::Download(format!("Could not rename '{name}' to '{folder}': {e}"))
            })?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether `id` looks like a video ID.
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11 && is_id_text(id)
}

/// Whether `id` looks like a playlist ID.
pub fn is_valid_playlist_id(id: &str) -> bool {
    (2..=64).contains(&id.len()) && is_id_text(id)
}

fn is_id_text(id: &str) -> bool {
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("AC/DC: Live?"), "AC_DC_ Live_");
        assert_eq!(sanitize("Metal | Mix..."), "Metal _ Mix");
        assert_eq!(sanitize("tab\there"), "tabhere");
        assert_eq!(sanitize(" . "), "_");
    }

    #[test]
    fn test_names_video() {
        assert!(names_video("01 | dQw4w9WgXcQ | Rick | Never.mkv", "dQw4w9WgXcQ"));
        assert!(names_video("dQw4w9WgXcQ | Rick | Never.mkv", "dQw4w9WgXcQ"));
        assert!(!names_video("01 | other | dQw4w9WgXcQ.mkv", "dQw4w9WgXcQ"));
    }

    #[test]
    fn test_ids() {
        assert!(is_valid_video_id("dQw4w9WgXcQ"));
        assert!(!is_valid_video_id("dQw4w9WgXc"));
        assert!(!is_valid_video_id("dQw4w9WgX Q"));
        assert!(is_valid_playlist_id("PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf"));
        assert!(!is_valid_playlist_id("../etc"));
    }

    #[test]
    fn test_chapter_split_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let id = "dQw4w9WgXcQ";
        fs::write(dir.path().join(format!("01 | {id} | Rick | Never.opus")), b"x").unwrap();
        fs::write(dir.path().join("02 | aaaaaaaaaaa | Other | Song.opus"), b"x").unwrap();

        assert_eq!(remove_unsplit_originals(dir.path(), id).unwrap(), 0);

        fs::create_dir(dir.path().join(format!("01 | {id} | Rick | Never"))).unwrap();
        assert_eq!(remove_unsplit_originals(dir.path(), id).unwrap(), 1);
        assert!(is_downloaded(dir.path(), id).unwrap());
        assert!(is_downloaded(dir.path(), "aaaaaaaaaaa").unwrap());
    }

    #[test]
    fn test_adopt_previous_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Old Name | PL123")).unwrap();

        let folder = playlist_folder("New Name", "PL123");
        assert!(adopt_previous_folder(dir.path(), &folder, "PL123").unwrap());
        assert!(dir.path().join("New Name | PL123").is_dir());
        assert!(!adopt_previous_folder(dir.path(), &folder, "PL123").unwrap());
    }
}
