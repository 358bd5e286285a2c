//! `playlistItems` resource: listing, moving and removing slots.

use curator_core::{Entry, MoveRequest, Result};
use tracing::{debug, info, warn};

use super::MAX_RESULTS;
use crate::parser::parse_playlist_item;
use crate::types::{ListResponse, RawPlaylistItem, UpdatePlaylistItem, UpdateResourceId, UpdateSnippet};
use crate::YouTubeClient;

impl YouTubeClient {
    /// Every raw item of a playlist, following page tokens to the end.
    pub async fn raw_playlist_items(&self, playlist_id: &str) -> Result<Vec<RawPlaylistItem>> {
        info!("Fetching playlist '{playlist_id}'");

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("part", "snippet,contentDetails,status,id"),
                ("playlistId", playlist_id),
                ("maxResults", MAX_RESULTS),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: ListResponse<RawPlaylistItem> = self.get("playlistItems", &query).await?;
            items.extend(page.items);

            let total = page.page_info.and_then(|p| p.total_results);
            debug!("Got {}/{} items", items.len(), total.unwrap_or_default());

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if let Some(writer) = self.snapshots() {
            if let Err(e) = writer.write_playlist_items(&items) {
                warn!("Could not write playlist snapshot: {e}");
            }
        }

        Ok(items)
    }

    /// Every entry of a playlist, validated.
    pub async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<Entry>> {
        let raw = self.raw_playlist_items(playlist_id).await?;
        raw.iter()
            .enumerate()
            .map(|(index, item)| parse_playlist_item(item, index))
            .collect()
    }

    /// Move a playlist item to an absolute position.
    pub async fn update_position(&self, request: &MoveRequest) -> Result<()> {
        let body = UpdatePlaylistItem {
            id: request.membership_id.clone(),
            snippet: UpdateSnippet {
                playlist_id: request.collection_id.clone(),
                position: request.position,
                resource_id: UpdateResourceId {
                    kind: "youtube#video",
                    video_id: request.resource_id.clone(),
                },
            },
        };

        self.put("playlistItems", &[("part", "snippet")], &body).await
    }

    /// Remove a playlist item.
    pub async fn delete_playlist_item(&self, membership_id: &str) -> Result<()> {
        self.delete_resource("playlistItems", &[("id", membership_id)]).await
    }
}
