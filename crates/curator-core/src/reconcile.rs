//! Duplicate and availability reconciliation.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::{Entry, Error, OrderedCollection, Result, SongHasher, Snapshot};

/// Entries sharing one canonical key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub canonical_key: String,
    pub entries: Vec<Entry>,
}

/// Classification of one snapshot.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Reconciliation {
    /// Entries to remove from the collection.
    pub to_delete: Vec<Entry>,
    /// Entries to keep, in position order.
    pub survivors: Vec<Entry>,
    /// Every key held by two or more entries.
    pub duplicate_groups: Vec<DuplicateGroup>,
    /// Unavailable entries kept because they are the only copy of their song.
    pub unavailable_kept: Vec<Entry>,
}

/// Outcome of applying deletions.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: Vec<Entry>,
    pub failed: Vec<FailedDeletion>,
    /// Remaining entries with positions renumbered to the compacted order.
    pub survivors: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailedDeletion {
    pub entry: Entry,
    pub reason: String,
}

/// Decides which entries to remove.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    hasher: SongHasher,
}

impl Reconciler {
    pub const fn new(hasher: SongHasher) -> Self {
        Self { hasher }
    }

    /// Classify a snapshot whose availability has already been resolved.
    ///
    /// An unavailable entry is deleted only when an available entry with the
    /// same canonical key stays in the collection. Available duplicates are
    /// reported but never deleted.
    pub fn plan(&self, snapshot: Snapshot) -> Result<Reconciliation> {
        let mut entries = snapshot.into_entries();
        for entry in &mut entries {
            if entry.title.trim().is_empty() {
                return Err(Error::malformed(Some(entry.position), "empty title"));
            }
            if entry.canonical_key.is_none() {
                entry.canonical_key = Some(self.hasher.canonical_key(entry));
            }
        }

        let duplicate_indices: Vec<Vec<usize>> = {
            let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for (index, entry) in entries.iter().enumerate() {
                groups.entry(entry.key()).or_default().push(index);
            }
            groups
                .into_values()
                .filter(|members| members.len() >= 2)
                .collect()
        };

        let mut delete = vec![false; entries.len()];
        for members in &duplicate_indices {
            info!(
                "Duplicate song '{}' at positions {:?}",
                entries[members[0]].key(),
                members_positions(&entries, members)
            );

            // Without a playable copy, each member may be the last reference
            // to a different song behind a placeholder title.
            if !members.iter().any(|&i| entries[i].is_available) {
                continue;
            }
            for &i in members.iter().filter(|&&i| !entries[i].is_available) {
                delete[i] = true;
            }
        }

        let duplicate_groups = duplicate_indices
            .into_iter()
            .map(|members| DuplicateGroup {
                canonical_key: entries[members[0]].key().to_string(),
                entries: members.iter().map(|&i| entries[i].clone()).collect(),
            })
            .collect();

        let mut reconciliation = Reconciliation {
            duplicate_groups,
            ..Reconciliation::default()
        };

        for (entry, delete) in entries.into_iter().zip(delete) {
            if delete {
                info!("Will delete unavailable duplicate {}", entry.label());
                reconciliation.to_delete.push(entry);
            } else {
                if !entry.is_available {
                    warn!(
                        "Keeping unavailable {} at position {}: no available copy",
                        entry.label(),
                        entry.position
                    );
                    reconciliation.unavailable_kept.push(entry.clone());
                }
                reconciliation.survivors.push(entry);
            }
        }

        Ok(reconciliation)
    }

    /// Issue one delete per planned entry.
    ///
    /// Deletions are not retried; a failed deletion is logged and the entry
    /// stays among the survivors.
    pub async fn execute<S>(&self, service: &S, reconciliation: Reconciliation) -> DeletionReport
    where
        S: OrderedCollection + ?Sized,
    {
        let mut report = DeletionReport::default();
        let mut kept = reconciliation.survivors;

        for entry in reconciliation.to_delete {
            match service.delete(&entry.membership_id).await {
                Ok(()) => {
                    info!("Deleted {} from position {}", entry.label(), entry.position);
                    report.deleted.push(entry);
                }
                Err(e) => {
                    warn!("Could not delete {}: {e}", entry.label());
                    report.failed.push(FailedDeletion {
                        entry: entry.clone(),
                        reason: e.to_string(),
                    });
                    kept.push(entry);
                }
            }
        }

        kept.sort_by_key(|e| e.position);
        for (position, entry) in kept.iter_mut().enumerate() {
            entry.position = position;
        }
        report.survivors = kept;
        report
    }
}

fn members_positions(entries: &[Entry], members: &[usize]) -> Vec<usize> {
    members.iter().map(|&i| entries[i].position).collect()
}
