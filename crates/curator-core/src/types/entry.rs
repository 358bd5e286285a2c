//! Playlist entry and fetch snapshot types.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One slot in a remote ordered collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Media item ID (`YouTube` video ID).
    pub id: String,
    /// Playlist item ID, required to move or delete this exact slot.
    pub membership_id: String,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
    /// Uploader channel ID (absent for private or deleted items).
    pub channel_id: Option<String>,
    /// Uploader channel name (absent for private or deleted items).
    pub channel_name: Option<String>,
    /// When the item was added to the collection.
    pub published_at: Option<DateTime<Utc>>,
    /// Zero-based index in the remote sequence at fetch time.
    pub position: usize,
    /// Whether the item can be played in the configured region.
    pub is_available: bool,
    /// Memoized canonical key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        membership_id: impl Into<String>,
        title: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            id: id.into(),
            membership_id: membership_id.into(),
            title: title.into(),
            description: String::new(),
            channel_id: None,
            channel_name: None,
            published_at: None,
            position,
            is_available: true,
            canonical_key: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channel_id = Some(id.into());
        self.channel_name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// The memoized canonical key, or an empty string if not yet computed.
    pub fn key(&self) -> &str {
        self.canonical_key.as_deref().unwrap_or("")
    }

    /// Human-readable label used in progress lines.
    pub fn label(&self) -> String {
        format!("{} ({})", self.id, self.canonical_key.as_deref().unwrap_or(&self.title))
    }
}

/// A validated, position-ordered fetch of a whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    /// Validate fetched entries and order them by position.
    ///
    /// Item IDs and membership IDs must be unique, and positions must form
    /// a contiguous `0..len` range.
    pub fn new(mut entries: Vec<Entry>) -> Result<Self> {
        {
            let mut ids = HashSet::with_capacity(entries.len());
            let mut memberships = HashSet::with_capacity(entries.len());

            for entry in &entries {
                if entry.id.is_empty() {
                    return Err(Error::malformed(Some(entry.position), "empty item id"));
                }
                if entry.membership_id.is_empty() {
                    return Err(Error::malformed(Some(entry.position), "empty membership id"));
                }
                if !ids.insert(entry.id.as_str()) {
                    return Err(Error::malformed(
                        Some(entry.position),
                        format!("item id {} appears more than once", entry.id),
                    ));
                }
                if !memberships.insert(entry.membership_id.as_str()) {
                    return Err(Error::malformed(
                        Some(entry.position),
                        format!("membership id {} appears more than once", entry.membership_id),
                    ));
                }
            }
        }

        entries.sort_by_key(|e| e.position);
        if let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(index, entry)| entry.position != *index)
        {
            return Err(Error::malformed(
                Some(entry.position),
                format!("positions are not contiguous, expected {index}"),
            ));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// IDs of every item, in position order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_orders_by_position() {
        let snapshot = Snapshot::new(vec![
            Entry::new("b", "pb", "Second", 1),
            Entry::new("a", "pa", "First", 0),
        ])
        .unwrap();
        assert_eq!(snapshot.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_rejects_gap() {
        let err = Snapshot::new(vec![
            Entry::new("a", "pa", "First", 0),
            Entry::new("b", "pb", "Third", 2),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { .. }));
    }

    #[test]
    fn test_snapshot_rejects_duplicate_membership() {
        let err = Snapshot::new(vec![
            Entry::new("a", "p", "First", 0),
            Entry::new("b", "p", "Second", 1),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("membership id p"));
    }

    #[test]
    fn test_entry_label_prefers_key() {
        let mut entry = Entry::new("a", "pa", "raw title", 0);
        assert_eq!(entry.label(), "a (raw title)");
        entry.canonical_key = Some("Artist - Song".into());
        assert_eq!(entry.label(), "a (Artist - Song)");
    }
}
