//! The remote ordered-collection boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CollectionInfo, DetailRecord, Entry, Result};

/// Maximum number of IDs per detail lookup.
pub const DETAILS_CHUNK_SIZE: usize = 50;

/// Move one membership to an absolute position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    /// Membership (playlist item) to move.
    pub membership_id: String,
    /// Collection holding the membership.
    pub collection_id: String,
    /// Absolute zero-based target position.
    pub position: usize,
    /// Media item referenced by the membership.
    pub resource_id: String,
}

/// A remote ordered collection whose only mutation is "move to position".
///
/// `move_item` must follow list-splice semantics: the item is removed from
/// its slot, then inserted at `position`, shifting the items in between.
#[async_trait]
pub trait OrderedCollection: Send + Sync {
    /// Metadata about the collection itself.
    async fn describe(&self, collection_id: &str) -> Result<CollectionInfo>;

    /// Every entry of the collection, with contiguous positions.
    async fn list_all(&self, collection_id: &str) -> Result<Vec<Entry>>;

    /// Availability metadata for the given item IDs.
    async fn list_details(&self, ids: &[String]) -> Result<Vec<DetailRecord>>;

    /// Move one membership to an absolute position.
    async fn move_item(&self, request: &MoveRequest) -> Result<()>;

    /// Remove one membership from its collection.
    async fn delete(&self, membership_id: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory collection with splice semantics and scripted failures.

    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::Error;

    #[derive(Default)]
    pub struct MemoryCollection {
        pub items: Mutex<Vec<Entry>>,
        pub details: Vec<DetailRecord>,
        pub moves: Mutex<Vec<MoveRequest>>,
        pub deletes: Mutex<Vec<String>>,
        pub move_failures: Mutex<VecDeque<Error>>,
        pub delete_failures: Mutex<Vec<String>>,
        pub move_attempts: Mutex<u32>,
        /// Number of ids passed to each `list_details` call.
        pub detail_calls: Mutex<Vec<usize>>,
    }

    impl MemoryCollection {
        pub fn new(items: Vec<Entry>) -> Self {
            Self {
                items: Mutex::new(items),
                ..Self::default()
            }
        }

        pub fn with_details(mut self, details: Vec<DetailRecord>) -> Self {
            self.details = details;
            self
        }

        /// Fail the next move attempts with these errors, in order.
        pub fn fail_moves(self, errors: impl IntoIterator<Item = Error>) -> Self {
            self.move_failures.lock().extend(errors);
            self
        }

        /// Fail deletes of these memberships.
        pub fn fail_deletes(self, membership_ids: &[&str]) -> Self {
            self.delete_failures
                .lock()
                .extend(membership_ids.iter().map(ToString::to_string));
            self
        }

        pub fn order(&self) -> Vec<String> {
            self.items.lock().iter().map(|e| e.id.clone()).collect()
        }
    }

    #[async_trait]
    impl OrderedCollection for MemoryCollection {
        async fn describe(&self, collection_id: &str) -> Result<CollectionInfo> {
            Ok(CollectionInfo {
                id: collection_id.to_string(),
                title: "Memory".to_string(),
                ..CollectionInfo::default()
            })
        }

        async fn list_all(&self, _collection_id: &str) -> Result<Vec<Entry>> {
            let items = self.items.lock();
            Ok(items
                .iter()
                .enumerate()
                .map(|(position, e)| Entry {
                    position,
                    ..e.clone()
                })
                .collect())
        }

        async fn list_details(&self, ids: &[String]) -> Result<Vec<DetailRecord>> {
            self.detail_calls.lock().push(ids.len());
            Ok(self
                .details
                .iter()
                .filter(|d| ids.contains(&d.id))
                .cloned()
                .collect())
        }

        async fn move_item(&self, request: &MoveRequest) -> Result<()> {
            *self.move_attempts.lock() += 1;
            if let Some(err) = self.move_failures.lock().pop_front() {
                return Err(err);
            }

            let mut items = self.items.lock();
            let from = items
                .iter()
                .position(|e| e.membership_id == request.membership_id)
                .ok_or_else(|| Error::NotFound(request.membership_id.clone()))?;
            if request.position >= items.len() {
                return Err(Error::InvalidArgument(format!(
                    "position {} out of range",
                    request.position
                )));
            }
            let item = items.remove(from);
            items.insert(request.position, item);
            self.moves.lock().push(request.clone());
            Ok(())
        }

        async fn delete(&self, membership_id: &str) -> Result<()> {
            if self.delete_failures.lock().iter().any(|m| m == membership_id) {
                return Err(Error::PermissionDenied(membership_id.to_string()));
            }
            let mut items = self.items.lock();
            let index = items
                .iter()
                .position(|e| e.membership_id == membership_id)
                .ok_or_else(|| Error::NotFound(membership_id.to_string()))?;
            items.remove(index);
            self.deletes.lock().push(membership_id.to_string());
            Ok(())
        }
    }
}
