//! Data API v3 request and response structures.
//!
//! Response fields the adapter depends on are optional here and checked in
//! [`crate::parser`], so a malformed item is reported with its position
//! instead of failing the whole page.

use serde::{Deserialize, Serialize};

/// One page of a list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: Option<u64>,
    pub results_per_page: Option<u64>,
}

/// `playlists` resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlaylist {
    pub id: Option<String>,
    pub snippet: Option<PlaylistSnippet>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
}

/// `playlistItems` resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlaylistItem {
    pub id: Option<String>,
    pub snippet: Option<PlaylistItemSnippet>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub published_at: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub video_owner_channel_id: Option<String>,
    pub video_owner_channel_title: Option<String>,
    pub playlist_id: Option<String>,
    pub position: Option<u64>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub privacy_status: Option<String>,
    pub upload_status: Option<String>,
}

/// `videos` resource, as requested with `contentDetails,status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideo {
    pub id: Option<String>,
    pub content_details: Option<VideoContentDetails>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    pub region_restriction: Option<RawRegionRestriction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRegionRestriction {
    pub allowed: Option<Vec<String>>,
    pub blocked: Option<Vec<String>>,
}

/// Body of `PUT playlistItems?part=snippet`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePlaylistItem {
    pub id: String,
    pub snippet: UpdateSnippet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippet {
    pub playlist_id: String,
    pub position: usize,
    pub resource_id: UpdateResourceId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceId {
    pub kind: &'static str,
    pub video_id: String,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub reason: Option<String>,
    pub message: Option<String>,
}
