//! [`OrderedCollection`] over a `YouTube` playlist.

use async_trait::async_trait;
use curator_core::{CollectionInfo, DetailRecord, Entry, MoveRequest, OrderedCollection, Result};

use crate::YouTubeClient;

#[async_trait]
impl OrderedCollection for YouTubeClient {
    async fn describe(&self, collection_id: &str) -> Result<CollectionInfo> {
        self.playlist_info(collection_id).await
    }

    async fn list_all(&self, collection_id: &str) -> Result<Vec<Entry>> {
        self.playlist_items(collection_id).await
    }

    async fn list_details(&self, ids: &[String]) -> Result<Vec<DetailRecord>> {
        self.video_details(ids).await
    }

    async fn move_item(&self, request: &MoveRequest) -> Result<()> {
        self.update_position(request).await
    }

    async fn delete(&self, membership_id: &str) -> Result<()> {
        self.delete_playlist_item(membership_id).await
    }
}
