//! Conversion of raw API responses into Curator types.

use chrono::{DateTime, Utc};
use curator_core::{CollectionInfo, DetailRecord, Entry, Error, HttpError, RegionRestriction, Result};

use crate::types::{ErrorEnvelope, RawPlaylist, RawPlaylistItem, RawVideo};

/// Title the API reports for items whose video was made private.
pub const PRIVATE_VIDEO_TITLE: &str = "Private video";
/// Title the API reports for items whose video was deleted.
pub const DELETED_VIDEO_TITLE: &str = "Deleted video";

/// Error reasons that mean "try again later".
const TRANSIENT_REASONS: &[&str] = &["SERVICE_UNAVAILABLE", "backendError", "internalError"];
/// Error reasons reported for quota and rate limits.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Convert one playlist item, validating the fields the curator relies on.
///
/// `index` is the item's position in the fetched sequence and is only used
/// to point at the offending item in errors.
pub fn parse_playlist_item(item: &RawPlaylistItem, index: usize) -> Result<Entry> {
    let at = Some(index);
    let membership_id = item
        .id
        .clone()
        .ok_or_else(|| Error::malformed(at, "missing playlist item id"))?;
    let snippet = item
        .snippet
        .as_ref()
        .ok_or_else(|| Error::malformed(at, format!("{membership_id}: missing snippet")))?;
    let title = snippet
        .title
        .clone()
        .ok_or_else(|| Error::malformed(at, format!("{membership_id}: missing title")))?;
    let position = snippet
        .position
        .ok_or_else(|| Error::malformed(at, format!("{membership_id}: missing position")))?;
    let video_id = snippet
        .resource_id
        .as_ref()
        .and_then(|r| r.video_id.clone())
        .ok_or_else(|| Error::malformed(at, format!("{membership_id}: missing videoId")))?;

    let privacy = item.status.as_ref().and_then(|s| s.privacy_status.as_deref());
    let is_available = !(title == DELETED_VIDEO_TITLE
        || (title == PRIVATE_VIDEO_TITLE && privacy == Some("private")));

    Ok(Entry {
        id: video_id,
        membership_id,
        title,
        description: snippet.description.clone(),
        channel_id: snippet.video_owner_channel_id.clone(),
        channel_name: snippet.video_owner_channel_title.clone(),
        published_at: snippet.published_at.as_deref().and_then(parse_timestamp),
        position: position as usize,
        is_available,
        canonical_key: None,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Convert one `videos` resource into a detail record.
pub fn parse_video(video: &RawVideo) -> Result<DetailRecord> {
    let id = video
        .id
        .clone()
        .ok_or_else(|| Error::ParseError("video without id".to_string()))?;

    let region_restriction = video
        .content_details
        .as_ref()
        .and_then(|d| d.region_restriction.as_ref())
        .map(|r| RegionRestriction {
            allowed: r.allowed.clone(),
            blocked: r.blocked.clone(),
        });

    Ok(DetailRecord {
        id,
        privacy_status: video.status.as_ref().and_then(|s| s.privacy_status.clone()),
        upload_status: video.status.as_ref().and_then(|s| s.upload_status.clone()),
        region_restriction,
    })
}

/// Convert a `playlists` resource.
pub fn parse_playlist(playlist: &RawPlaylist) -> Result<CollectionInfo> {
    let id = playlist
        .id
        .clone()
        .ok_or_else(|| Error::ParseError("playlist without id".to_string()))?;
    let snippet = playlist
        .snippet
        .as_ref()
        .ok_or_else(|| Error::ParseError(format!("playlist {id} without snippet")))?;

    Ok(CollectionInfo {
        title: snippet.title.clone().unwrap_or_else(|| id.clone()),
        description: snippet.description.clone(),
        channel_id: snippet.channel_id.clone(),
        channel_name: snippet.channel_title.clone(),
        id,
    })
}

/// Classify a non-success response.
pub fn parse_error(status: u16, body: &str, retry_after_secs: Option<u64>) -> Error {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map_or_else(|| body.to_string(), |e| e.error.message.clone());

    let reasons: Vec<&str> = envelope
        .as_ref()
        .map(|e| {
            e.error
                .errors
                .iter()
                .filter_map(|d| d.reason.as_deref())
                .chain(e.error.status.as_deref())
                .collect()
        })
        .unwrap_or_default();
    let has_reason = |known: &[&str]| reasons.iter().any(|r| known.contains(r));

    if status == 429 || has_reason(RATE_LIMIT_REASONS) {
        return Error::RateLimited { retry_after_secs };
    }
    if status >= 500 || has_reason(TRANSIENT_REASONS) {
        return Error::ServiceUnavailable(format!("{status}: {message}"));
    }

    match status {
        401 | 403 => Error::PermissionDenied(message),
        404 => Error::NotFound(message),
        _ => Error::Http(HttpError::StatusError { status, message }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(json: &str) -> RawPlaylistItem {
        serde_json::from_str(json).unwrap()
    }

    const ITEM: &str = r#"{
        "kind": "youtube#playlistItem",
        "id": "UExtem1",
        "snippet": {
            "publishedAt": "2023-05-01T10:00:00Z",
            "title": "Judas Priest - Painkiller",
            "description": "",
            "videoOwnerChannelTitle": "Judas Priest",
            "videoOwnerChannelId": "UCjp",
            "playlistId": "PL1",
            "position": 4,
            "resourceId": {"kind": "youtube#video", "videoId": "nM__lPTWThU"}
        },
        "status": {"privacyStatus": "public"}
    }"#;

    #[test]
    fn test_parse_item() {
        let entry = parse_playlist_item(&item(ITEM), 4).unwrap();
        assert_eq!(entry.id, "nM__lPTWThU");
        assert_eq!(entry.membership_id, "UExtem1");
        assert_eq!(entry.position, 4);
        assert_eq!(entry.channel_id.as_deref(), Some("UCjp"));
        assert!(entry.is_available);
        assert!(entry.published_at.is_some());
    }

    #[test]
    fn test_private_and_deleted_items_unavailable() {
        let private = item(
            r#"{"id": "p1", "snippet": {"title": "Private video", "position": 0,
                "resourceId": {"videoId": "v1"}}, "status": {"privacyStatus": "private"}}"#,
        );
        let deleted = item(
            r#"{"id": "p2", "snippet": {"title": "Deleted video", "position": 1,
                "resourceId": {"videoId": "v2"}}, "status": {"privacyStatus": "privacyStatusUnspecified"}}"#,
        );

        let private = parse_playlist_item(&private, 0).unwrap();
        assert!(!private.is_available);
        assert!(private.channel_name.is_none());
        assert!(!parse_playlist_item(&deleted, 1).unwrap().is_available);
    }

    #[test]
    fn test_missing_video_id_is_malformed() {
        let raw = item(r#"{"id": "p1", "snippet": {"title": "T", "position": 0, "resourceId": {}}}"#);
        let err = parse_playlist_item(&raw, 7).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedEntry {
                position: Some(7),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_video_region_restriction() {
        let video: RawVideo = serde_json::from_str(
            r#"{"id": "v1", "contentDetails": {"regionRestriction": {"blocked": ["FR", "DE"]}},
                "status": {"privacyStatus": "public", "uploadStatus": "processed"}}"#,
        )
        .unwrap();

        let record = parse_video(&video).unwrap();
        assert!(record.region_restriction.unwrap().excludes("fr"));
        assert_eq!(record.upload_status.as_deref(), Some("processed"));
    }

    #[test]
    fn test_error_classification() {
        let unavailable = r#"{"error": {"code": 409, "message": "busy",
            "errors": [{"reason": "SERVICE_UNAVAILABLE"}]}}"#;
        assert!(matches!(
            parse_error(409, unavailable, None),
            Error::ServiceUnavailable(_)
        ));
        assert!(parse_error(503, "", None).is_transient());
        assert!(matches!(
            parse_error(429, "", Some(7)),
            Error::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
        assert!(matches!(parse_error(404, "{}", None), Error::NotFound(_)));
        assert!(matches!(
            parse_error(403, r#"{"error": {"message": "forbidden", "errors": []}}"#, None),
            Error::PermissionDenied(m) if m == "forbidden"
        ));
        let bad = parse_error(400, "bad", None);
        assert!(!bad.is_transient());
        assert!(matches!(bad, Error::Http(HttpError::StatusError { status: 400, .. })));
    }
}
