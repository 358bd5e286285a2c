//! # curator-core
//!
//! Canonical song keys, duplicate and availability reconciliation, and
//! minimal-move reordering of a remote ordered collection.

pub mod availability;
pub mod curate;
pub mod error;
pub mod hash;
pub mod normalize;
pub mod reconcile;
pub mod retry;
pub mod service;
pub mod sort;
pub mod types;

pub use curate::{CurateOptions, CurateReport, Curator};
pub use error::{Error, HttpError, Result};
pub use hash::{HashingConfig, SongHasher};
pub use reconcile::{DeletionReport, Reconciler, Reconciliation};
pub use retry::{CircuitBreaker, RetryConfig, RetryPolicy};
pub use service::{MoveRequest, OrderedCollection};
pub use sort::{MinimalMoveSorter, Move, MovePlan, ReorderOutcome};
pub use types::*;
