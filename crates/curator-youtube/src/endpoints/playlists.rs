//! `playlists` resource.

use curator_core::{CollectionInfo, Error, Result};
use tracing::info;

use crate::parser::parse_playlist;
use crate::types::{ListResponse, RawPlaylist};
use crate::YouTubeClient;

impl YouTubeClient {
    /// Title, description and owner of a playlist.
    pub async fn playlist_info(&self, playlist_id: &str) -> Result<CollectionInfo> {
        info!("Getting info of playlist '{playlist_id}'");

        let response: ListResponse<RawPlaylist> = self
            .get("playlists", &[("part", "snippet"), ("id", playlist_id)])
            .await?;

        let playlist = response
            .items
            .first()
            .ok_or_else(|| Error::NotFound(format!("playlist {playlist_id}")))?;

        parse_playlist(playlist)
    }
}
