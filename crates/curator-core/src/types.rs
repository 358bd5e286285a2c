//! Core domain types for Curator.

pub mod detail;
pub mod entry;

pub use detail::{CollectionInfo, DetailRecord, RegionRestriction};
pub use entry::{Entry, Snapshot};
