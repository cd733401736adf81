//! YouTube link resolver
//!
//! Turns a YouTube reference (a link, a bare video id, or a chat message
//! containing a link) into video metadata, a direct stream URL, a playlist's
//! video ids, or a local media file.
//!
//! # Architecture
//!
//! Metadata is resolved through a chain of tiers tried in order:
//! - **Search**: a single Innertube search request
//! - **Extractor**: full extraction through `yt-dlp`
//! - **Proxy**: Invidious mirrors, used only when YouTube demands a sign-in
//!
//! Every operation is spaced by a jittered rate limiter and sends a randomly
//! chosen browser user agent.
//!
//! # Examples
//!
//! ```rust
//! use yt_resolver::{Settings, YouTubeResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = YouTubeResolver::new(Settings::default())?;
//! let details = resolver.details("dQw4w9WgXcQ", true).await;
//! if let Some(video) = details.value() {
//!     println!("{} ({})", video.title(), video.url());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod resolver;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use resolver::{ResolverGeneric, YouTubeResolver};
pub use types::{DownloadOutcome, DownloadSpec, MediaKind, Message, Resolution, VideoRef};
