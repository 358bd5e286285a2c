//! One full curation pass over a collection.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::availability::apply_details;
use crate::reconcile::{DuplicateGroup, FailedDeletion};
use crate::retry::RetryConfig;
use crate::service::DETAILS_CHUNK_SIZE;
use crate::sort::{Move, DEFAULT_PACING};
use crate::{
    DetailRecord, Entry, MinimalMoveSorter, OrderedCollection, Reconciler, Result, Snapshot,
    SongHasher,
};

/// Settings for a curation pass.
#[derive(Debug, Clone)]
pub struct CurateOptions {
    pub collection_id: String,
    /// Region whose restrictions decide availability.
    pub region: Option<String>,
    /// Plan deletions and moves without mutating the collection.
    pub dry_run: bool,
    /// Delete unavailable duplicates.
    pub delete_unavailable: bool,
    /// Reorder the collection after reconciliation.
    pub sort: bool,
    pub pacing: Duration,
    pub retry: RetryConfig,
}

impl CurateOptions {
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            region: None,
            dry_run: false,
            delete_unavailable: true,
            sort: true,
            pacing: DEFAULT_PACING,
            retry: RetryConfig::default(),
        }
    }
}

/// Summary of a curation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CurateReport {
    pub collection_id: String,
    pub fetched: usize,
    pub marked_unavailable: usize,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub unavailable_kept: Vec<Entry>,
    pub deleted: Vec<Entry>,
    /// Deletions that would have been issued in a dry run.
    pub planned_deletions: Vec<Entry>,
    pub failed_deletions: Vec<FailedDeletion>,
    pub moves: Vec<Move>,
    pub dry_run: bool,
    /// Final order, as `canonical key [id]` lines.
    pub final_order: Vec<String>,
}

/// Fetch detail records for `ids`, at most [`DETAILS_CHUNK_SIZE`] per request.
pub async fn fetch_details<S>(service: &S, ids: &[String]) -> Result<Vec<DetailRecord>>
where
    S: OrderedCollection + ?Sized,
{
    let mut details = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(DETAILS_CHUNK_SIZE) {
        details.extend(service.list_details(chunk).await?);
    }
    Ok(details)
}

/// Runs fetch, reconciliation and reordering against one service.
pub struct Curator<'a, S: OrderedCollection + ?Sized> {
    service: &'a S,
    hasher: SongHasher,
    options: CurateOptions,
}

impl<'a, S: OrderedCollection + ?Sized> Curator<'a, S> {
    pub const fn new(service: &'a S, hasher: SongHasher, options: CurateOptions) -> Self {
        Self {
            service,
            hasher,
            options,
        }
    }

    pub async fn run(&self) -> Result<CurateReport> {
        let options = &self.options;
        let mut report = CurateReport {
            collection_id: options.collection_id.clone(),
            dry_run: options.dry_run,
            ..CurateReport::default()
        };

        info!("Fetching collection {}", options.collection_id);
        let entries = self.service.list_all(&options.collection_id).await?;
        let mut snapshot = Snapshot::new(entries)?;
        report.fetched = snapshot.len();
        info!("Fetched {} items", report.fetched);

        let ids = snapshot.ids();
        let details = fetch_details(self.service, &ids).await?;
        report.marked_unavailable =
            apply_details(snapshot.entries_mut(), &details, options.region.as_deref());
        self.hasher.annotate(snapshot.entries_mut());

        let reconciler = Reconciler::new(self.hasher.clone());
        let mut reconciliation = reconciler.plan(snapshot)?;
        report.duplicate_groups = reconciliation.duplicate_groups.clone();
        report.unavailable_kept = reconciliation.unavailable_kept.clone();

        let survivors = if !options.delete_unavailable {
            // Deletion candidates stay in the collection.
            let mut kept = std::mem::take(&mut reconciliation.survivors);
            kept.append(&mut reconciliation.to_delete);
            kept.sort_by_key(|e| e.position);
            kept
        } else if options.dry_run {
            for entry in &reconciliation.to_delete {
                info!("[dry run] Would delete {}", entry.label());
            }
            report.planned_deletions = std::mem::take(&mut reconciliation.to_delete);
            // Simulate the compacted order the deletions would leave behind.
            renumber(reconciliation.survivors)
        } else {
            let deletion = reconciler.execute(self.service, reconciliation).await;
            report.deleted = deletion.deleted;
            report.failed_deletions = deletion.failed;
            deletion.survivors
        };

        let survivors = if options.sort {
            let sorter = MinimalMoveSorter::new(self.hasher.clone())
                .with_retry(options.retry)
                .with_pacing(options.pacing)
                .with_dry_run(options.dry_run);
            let outcome = sorter
                .reorder(self.service, &options.collection_id, &survivors)
                .await?;
            report.moves = outcome.moves;
            outcome.sorted
        } else {
            survivors
        };

        report.final_order = survivors
            .iter()
            .map(|e| format!("{} [{}]", e.key(), e.id))
            .collect();

        info!(
            "Done: {} fetched, {} deleted, {} moves",
            report.fetched,
            report.deleted.len(),
            report.moves.len()
        );

        Ok(report)
    }
}

fn renumber(mut entries: Vec<Entry>) -> Vec<Entry> {
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.position = position;
    }
    entries
}
