//! `videos` resource: availability details.

use curator_core::service::DETAILS_CHUNK_SIZE;
use curator_core::{DetailRecord, Result};
use tracing::{debug, warn};

use crate::parser::parse_video;
use crate::types::{ListResponse, RawVideo};
use crate::YouTubeClient;

impl YouTubeClient {
    /// Status and region restrictions of the given videos.
    ///
    /// IDs the API does not return (deleted videos) have no record.
    pub async fn video_details(&self, ids: &[String]) -> Result<Vec<DetailRecord>> {
        let mut records = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(DETAILS_CHUNK_SIZE) {
            let joined = chunk.join(",");
            let page: ListResponse<RawVideo> = self
                .get("videos", &[("part", "contentDetails,status"), ("id", joined.as_str())])
                .await?;
            debug!("Got details for {}/{} videos", page.items.len(), chunk.len());

            if let Some(writer) = self.snapshots() {
                if let Err(e) = writer.append_video_details(&page.items) {
                    warn!("Could not write video details snapshot: {e}");
                }
            }

            for video in &page.items {
                records.push(parse_video(video)?);
            }
        }

        Ok(records)
    }
}
