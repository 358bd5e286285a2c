use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "curator", version, about = "Keep a YouTube playlist de-duplicated and sorted")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Authorized-user credentials file
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove dead duplicates and sort a playlist
    Sort(SortArgs),
    /// Download a playlist's videos with yt-dlp
    Backup(BackupArgs),
    /// Print the canonical key of a title
    Hash(HashArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct SortArgs {
    pub playlist_id: String,
    /// Region code for availability checks
    #[arg(long)]
    pub region: Option<String>,
    /// Plan deletions and moves without changing the playlist
    #[arg(long)]
    pub dry_run: bool,
    /// Don't delete unavailable duplicates
    #[arg(long)]
    pub keep_unavailable: bool,
    /// Only reconcile, don't reorder
    #[arg(long)]
    pub no_sort: bool,
    /// Write raw API responses to this folder
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,
    /// Write the run report as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    pub playlist_id: String,
    /// Backup root folder
    #[arg(long)]
    pub dest: Option<PathBuf>,
    /// Extract audio and split by chapter
    #[arg(long)]
    pub audio_only: bool,
    /// Region code for availability checks
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Debug, Args)]
pub struct HashArgs {
    pub title: String,
    /// Video description (`\n` is read as a newline)
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub channel_id: Option<String>,
    #[arg(long)]
    pub channel_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Save the effective configuration to the config file
    #[arg(long)]
    pub write: bool,
}
