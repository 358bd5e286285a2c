//! Minimal-move reordering of a remote collection.
//!
//! The target order is a stable sort on `canonical_key + "[" + id + "]"`.
//! Slots are fixed from the last index down to the first: each misplaced
//! slot costs exactly one remote move of the item that belongs there, and
//! because every later move targets a lower index, a fixed slot is never
//! disturbed again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::retry::{retry_transient, CircuitBreaker, RetryConfig, RetryPolicy};
use crate::{Entry, Error, MoveRequest, OrderedCollection, Result, SongHasher};

/// Default pause before every remote move.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// One planned or performed move.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Move {
    pub membership_id: String,
    pub item_id: String,
    pub canonical_key: String,
    /// Working index the item is taken from.
    pub from: usize,
    /// Absolute index the item is moved to.
    pub to: usize,
}

/// The moves that turn the current order into the target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    /// Entries in target order, positions reassigned.
    pub sorted: Vec<Entry>,
    /// Moves to issue, in order.
    pub moves: Vec<Move>,
}

impl MovePlan {
    pub fn is_sorted(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Result of a reorder pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub sorted: Vec<Entry>,
    /// Moves confirmed by the service (or planned, for a dry run).
    pub moves: Vec<Move>,
    pub dry_run: bool,
}

/// Reorders a collection with the fewest "move to position" calls.
#[derive(Debug, Clone)]
pub struct MinimalMoveSorter {
    hasher: SongHasher,
    policy: RetryPolicy,
    breaker: RetryConfig,
    pacing: Duration,
    dry_run: bool,
}

impl Default for MinimalMoveSorter {
    fn default() -> Self {
        Self::new(SongHasher::default())
    }
}

impl MinimalMoveSorter {
    pub fn new(hasher: SongHasher) -> Self {
        Self {
            hasher,
            policy: RetryPolicy::default(),
            breaker: RetryConfig::default(),
            pacing: DEFAULT_PACING,
            dry_run: false,
        }
    }

    /// Use these retry and circuit breaker settings.
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.policy = config.into();
        self.breaker = config;
        self
    }

    /// Pause before every remote move.
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Plan without calling the service.
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn sort_key(&self, entry: &Entry) -> String {
        let key = entry
            .canonical_key
            .clone()
            .unwrap_or_else(|| self.hasher.canonical_key(entry));
        format!("{key}[{}]", entry.id)
    }

    /// Compute the move sequence for `current`, given in remote order.
    pub fn plan(&self, current: &[Entry]) -> Result<MovePlan> {
        // Entries are addressed by their index in this owned buffer; the
        // working array is a permutation of those indices.
        let buffer: Vec<Entry> = current
            .iter()
            .map(|e| {
                let mut entry = e.clone();
                if entry.canonical_key.is_none() {
                    entry.canonical_key = Some(self.hasher.canonical_key(&entry));
                }
                entry
            })
            .collect();

        let keys: Vec<String> = buffer.iter().map(|e| self.sort_key(e)).collect();
        let mut target: Vec<usize> = (0..buffer.len()).collect();
        target.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let mut working: Vec<usize> = (0..buffer.len()).collect();
        let mut moves = Vec::new();

        for i in (0..target.len()).rev() {
            let wanted = target[i];
            if working[i] == wanted {
                continue;
            }

            let j = working[..i]
                .iter()
                .position(|&slot| slot == wanted)
                .ok_or_else(|| {
                    Error::InvariantViolation(format!(
                        "{} not found below position {i}",
                        buffer[wanted].label()
                    ))
                })?;

            let entry = &buffer[wanted];
            moves.push(Move {
                membership_id: entry.membership_id.clone(),
                item_id: entry.id.clone(),
                canonical_key: entry.key().to_string(),
                from: j,
                to: i,
            });

            working.remove(j);
            working.insert(i, wanted);
        }

        let sorted = target
            .iter()
            .enumerate()
            .map(|(position, &index)| Entry {
                position,
                ..buffer[index].clone()
            })
            .collect();

        Ok(MovePlan { sorted, moves })
    }

    /// Reorder the remote collection to match the canonical order.
    ///
    /// Moves are issued one at a time. Transient failures are retried under
    /// the configured policy; any other failure aborts the pass, leaving the
    /// moves already confirmed in place.
    pub async fn reorder<S>(
        &self,
        service: &S,
        collection_id: &str,
        current: &[Entry],
    ) -> Result<ReorderOutcome>
    where
        S: OrderedCollection + ?Sized,
    {
        info!("Sorting collection with {} items", current.len());
        let plan = self.plan(current)?;

        if plan.is_sorted() {
            info!("Collection already sorted");
            return Ok(ReorderOutcome {
                sorted: plan.sorted,
                moves: Vec::new(),
                dry_run: self.dry_run,
            });
        }

        if self.dry_run {
            for m in &plan.moves {
                info!(
                    "[dry run] Would move {} ({}) from position {} to {}",
                    m.item_id, m.canonical_key, m.from, m.to
                );
            }
            return Ok(ReorderOutcome {
                sorted: plan.sorted,
                moves: plan.moves,
                dry_run: true,
            });
        }

        let mut breaker = CircuitBreaker::from(self.breaker);
        let mut done = Vec::with_capacity(plan.moves.len());

        for m in plan.moves {
            info!(
                "Moving {} ({}) from position {} to {}",
                m.item_id, m.canonical_key, m.from, m.to
            );

            let request = MoveRequest {
                membership_id: m.membership_id.clone(),
                collection_id: collection_id.to_string(),
                position: m.to,
                resource_id: m.item_id.clone(),
            };

            let what = format!("Move of {}", m.item_id);
            let request = &request;
            let pacing = self.pacing;
            retry_transient(&self.policy, &mut breaker, &what, move || async move {
                tokio::time::sleep(pacing).await;
                service.move_item(request).await
            })
            .await?;

            debug!("Moved {} to {}", m.item_id, m.to);
            done.push(m);
        }

        info!("Collection sorted with {} moves", done.len());

        Ok(ReorderOutcome {
            sorted: plan.sorted,
            moves: done,
            dry_run: false,
        })
    }
}

/// Apply moves to a sequence with list-splice semantics.
pub fn replay_moves<T, F>(items: &mut Vec<T>, moves: &[Move], id_of: F) -> Result<()>
where
    F: Fn(&T) -> &str,
{
    for m in moves {
        let from = items
            .iter()
            .position(|item| id_of(item) == m.membership_id)
            .ok_or_else(|| Error::InvariantViolation(format!("{} missing", m.membership_id)))?;
        let item = items.remove(from);
        items.insert(m.to, item);
    }
    Ok(())
}
