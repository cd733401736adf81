//! Type definitions for the resolver
//!
//! This module contains the data structures shared by the resolution tiers,
//! the download executor and callers.

pub mod message;
pub mod request;
pub mod serde_helpers;
pub mod video;

pub use message::{EntityKind, Message, MessageEntity};
pub use request::{DownloadMode, DownloadOutcome, DownloadSpec, MediaKind};
pub use video::{Resolution, VideoRef, WATCH_BASE, is_valid_video_id, thumbnail_for};
