//! Subcommands of the `yt-resolver` binary

use crate::resolver::{MediaExtractor, ResolverGeneric};
use crate::types::{DownloadSpec, MediaKind, Message};
use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::{Value, json};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve video metadata
    Details {
        /// Link, or bare video id with --video-id
        link: String,
        /// Treat LINK as a bare video id
        #[arg(long)]
        video_id: bool,
    },

    /// Check whether a link is a canonical video link (no network)
    Exists {
        link: String,
        #[arg(long)]
        video_id: bool,
    },

    /// Resolve a direct stream URL
    Video {
        link: String,
        #[arg(long)]
        video_id: bool,
    },

    /// List the video ids of a playlist
    Playlist {
        /// Link, or bare playlist id with --video-id
        link: String,
        /// Maximum number of ids
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
        /// Requesting user, recorded in logs
        #[arg(short, long, default_value_t = 0)]
        user_id: i64,
        #[arg(long)]
        video_id: bool,
    },

    /// Download media into the download directory
    Download {
        link: String,
        #[arg(long)]
        video_id: bool,
        /// Media kind
        #[arg(short, long, value_enum, default_value_t = MediaKind::Audio)]
        kind: MediaKind,
        /// Explicit yt-dlp format selector
        #[arg(short, long, value_name = "FORMAT")]
        format_id: Option<String>,
        /// Output file name (without extension)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Extract the first YouTube link from a message JSON document
    Url {
        /// Message file; stdin when omitted
        file: Option<PathBuf>,
    },
}

/// JSON result of a command and whether it counts as success
#[derive(Debug)]
pub struct CommandOutput {
    pub json: Value,
    pub success: bool,
}

impl CommandOutput {
    fn new(json: Value, success: bool) -> Self {
        Self { json, success }
    }
}

/// Run one subcommand against a resolver
pub async fn run_command<E: MediaExtractor + 'static>(
    resolver: &ResolverGeneric<E>,
    command: Command,
) -> Result<CommandOutput> {
    let output = match command {
        Command::Details { link, video_id } => {
            let resolution = resolver.details(&link, video_id).await;
            let success = resolution.is_found();
            CommandOutput::new(serde_json::to_value(resolution)?, success)
        }
        Command::Exists { link, video_id } => {
            let exists = resolver.exists(&link, video_id);
            CommandOutput::new(json!(exists), exists)
        }
        Command::Video { link, video_id } => {
            let resolution = resolver.video(&link, video_id).await;
            let success = resolution.is_found();
            CommandOutput::new(serde_json::to_value(resolution)?, success)
        }
        Command::Playlist {
            link,
            limit,
            user_id,
            video_id,
        } => {
            let ids = resolver.playlist(&link, limit, user_id, video_id).await;
            CommandOutput::new(json!(ids), true)
        }
        Command::Download {
            link,
            video_id,
            kind,
            format_id,
            title,
        } => {
            let mut spec = DownloadSpec::new(link)
                .with_video_id(video_id)
                .with_kind(kind);
            spec.format_id = format_id;
            spec.title = title;

            let outcome = resolver.download(&spec).await?;
            CommandOutput::new(serde_json::to_value(outcome)?, true)
        }
        Command::Url { file } => {
            let message = read_message(file).await?;
            let url = resolver.url(&message);
            let found = url.is_some();
            CommandOutput::new(json!({ "url": url }), found)
        }
    };

    Ok(output)
}

async fn read_message(file: Option<PathBuf>) -> Result<Message> {
    let raw = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read message from stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("Invalid message JSON")
}
