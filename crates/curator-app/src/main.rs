//! # Curator
//!
//! Keeps a `YouTube` playlist free of dead duplicates and sorted by artist
//! and title, and backs playlists up with yt-dlp.

mod cli;
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use curator_core::{CurateOptions, CurateReport, Curator, Entry, SongHasher};
use curator_extractor::{backup_playlist, BackupOptions, Extractor};
use curator_youtube::{AuthorizedUserFile, SnapshotWriter, YouTubeClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{BackupArgs, Cli, Command, ConfigArgs, HashArgs, SortArgs};
use crate::config::{default_config_path, AppConfig};

const DEFAULT_FILTER: &str = "curator=info,curator_core=info,curator_youtube=info,curator_extractor=info";
const VERBOSE_FILTER: &str =
    "curator=debug,curator_core=debug,curator_youtube=debug,curator_extractor=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!("Starting Curator v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Sort(args) => sort(&config, cli.credentials, args).await,
        Command::Backup(args) => backup(&config, cli.credentials, args).await,
        Command::Hash(args) => {
            hash(&config, &args);
            Ok(())
        }
        Command::Config(args) => show_config(&config, cli.config, &args),
    }
}

fn client(config: &AppConfig, credentials: Option<PathBuf>, debug_dir: Option<PathBuf>) -> Result<YouTubeClient> {
    let path = credentials
        .or_else(|| config.credentials_path.clone())
        .context("No credentials file configured, pass --credentials")?;
    let provider = AuthorizedUserFile::load(&path)?;

    let mut client = YouTubeClient::new(Arc::new(provider))?;
    if let Some(dir) = debug_dir.or_else(|| config.debug_dir.clone()) {
        client = client.with_snapshots(SnapshotWriter::new(dir));
    }
    Ok(client)
}

async fn sort(config: &AppConfig, credentials: Option<PathBuf>, args: SortArgs) -> Result<()> {
    let client = client(config, credentials, args.debug_dir)?;

    let options = CurateOptions {
        region: Some(args.region.unwrap_or_else(|| config.region.clone())),
        dry_run: args.dry_run,
        delete_unavailable: !args.keep_unavailable,
        sort: !args.no_sort,
        pacing: Duration::from_millis(config.pacing_ms),
        retry: config.retry,
        ..CurateOptions::new(args.playlist_id)
    };

    let hasher = SongHasher::new(config.hashing.clone());
    let report = Curator::new(&client, hasher, options).run().await?;

    print_summary(&report);

    if let Some(output) = args.output {
        std::fs::write(&output, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
        println!("\nReport saved to {}", output.display());
    }

    Ok(())
}

fn print_summary(report: &CurateReport) {
    let prefix = if report.dry_run { "[dry run] " } else { "" };

    println!("{prefix}Playlist {}: {} items", report.collection_id, report.fetched);

    if report.duplicate_groups.is_empty() {
        println!("No duplicates found.");
    } else {
        println!("\nDuplicate songs found:");
        for group in &report.duplicate_groups {
            println!("\n  {}", group.canonical_key);
            for entry in &group.entries {
                println!("    position {}: {}", entry.position, availability(entry));
            }
        }
    }

    for entry in &report.unavailable_kept {
        println!("Kept unavailable {} at position {}", entry.label(), entry.position);
    }
    for entry in report.deleted.iter().chain(&report.planned_deletions) {
        println!("{prefix}Deleted {}", entry.label());
    }
    for failure in &report.failed_deletions {
        println!("Could not delete {}: {}", failure.entry.label(), failure.reason);
    }

    println!(
        "\n{prefix}{} deleted, {} moves, {} items in final order",
        report.deleted.len() + report.planned_deletions.len(),
        report.moves.len(),
        report.final_order.len()
    );
}

fn availability(entry: &Entry) -> String {
    if entry.is_available {
        format!("{} ({})", entry.title, entry.id)
    } else {
        format!("{} ({}, unavailable)", entry.title, entry.id)
    }
}

async fn backup(config: &AppConfig, credentials: Option<PathBuf>, args: BackupArgs) -> Result<()> {
    let client = client(config, credentials, None)?;

    let mut extractor = Extractor::new();
    if let Some(path) = &config.yt_dlp_path {
        extractor = extractor.with_yt_dlp_path(path);
    }

    let options = BackupOptions {
        collection_id: args.playlist_id,
        dest: args.dest.unwrap_or_else(|| config.backup_dir.clone()),
        region: Some(args.region.unwrap_or_else(|| config.region.clone())),
        audio_only: args.audio_only,
    };

    let hasher = SongHasher::new(config.hashing.clone());
    let report = backup_playlist(&client, &extractor, &hasher, &options).await?;

    println!(
        "Backup in {}: {} downloaded, {} already present, {} unavailable, {} auto-generated skipped",
        report.folder.display(),
        report.downloaded.len(),
        report.already_present.len(),
        report.skipped_unavailable.len(),
        report.skipped_auto_generated.len()
    );
    for (id, reason) in &report.failed {
        eprintln!("Could not download video '{id}': {reason}");
    }

    Ok(())
}

fn hash(config: &AppConfig, args: &HashArgs) {
    let mut entry = Entry::new("", "", args.title.clone(), 0);
    if let Some(description) = &args.description {
        entry = entry.with_description(description.replace("\\n", "\n"));
    }
    entry.channel_id = args.channel_id.clone();
    entry.channel_name = args.channel_name.clone();

    let hasher = SongHasher::new(config.hashing.clone());
    println!("{}", hasher.canonical_key(&entry));
}

fn show_config(config: &AppConfig, path: Option<PathBuf>, args: &ConfigArgs) -> Result<()> {
    if args.write {
        let path = path
            .or_else(default_config_path)
            .context("No config directory available, pass --config")?;
        config.save(&path)?;
        println!("Config written to {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}
