//! # curator-youtube
//!
//! `YouTube` Data API v3 adapter for Curator.
//!
//! Implements [`curator_core::OrderedCollection`] on top of the `playlists`,
//! `playlistItems` and `videos` resources, with OAuth credentials supplied
//! through a [`CredentialProvider`].

pub mod auth;
pub mod client;
mod collection;
pub mod endpoints;
pub mod parser;
pub mod snapshot;
pub mod types;

pub use auth::{AuthorizedUserFile, CredentialProvider, StaticToken};
pub use client::YouTubeClient;
pub use snapshot::SnapshotWriter;
