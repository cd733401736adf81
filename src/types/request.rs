//! Download request type definitions
//!
//! Defines the parameters of a download and the mode they select.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of media to materialize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio track converted to the configured codec
    #[default]
    Audio,
    /// Combined audio and video in mp4
    Video,
}

/// Download mode selected by a [`DownloadSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Explicit format or title, video output
    VideoSnippet,
    /// Explicit format or title, audio output
    AudioSnippet,
    /// Default video download named by id
    FullVideo,
    /// Default audio download named by id
    Audio,
}

/// Request for a media download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSpec {
    /// Link, or bare video id when `is_video_id` is set
    pub link: String,

    /// Treat `link` as a bare video id
    pub is_video_id: bool,

    /// Audio or video output
    pub kind: MediaKind,

    /// Explicit yt-dlp format selector
    pub format_id: Option<String>,

    /// Output file stem overriding the video id
    pub title: Option<String>,
}

impl DownloadSpec {
    /// Create a default (audio) request for a link
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            is_video_id: false,
            kind: MediaKind::Audio,
            format_id: None,
            title: None,
        }
    }

    /// Set the bare-id flag
    pub fn with_video_id(mut self, is_video_id: bool) -> Self {
        self.is_video_id = is_video_id;
        self
    }

    /// Set media kind
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set explicit format selector
    pub fn with_format_id(mut self, format_id: impl Into<String>) -> Self {
        self.format_id = Some(format_id.into());
        self
    }

    /// Set output title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mode implied by the flags. An explicit format or title selects a
    /// snippet download.
    pub fn mode(&self) -> DownloadMode {
        let explicit = self.format_id.is_some() || self.title.is_some();
        match (self.kind, explicit) {
            (MediaKind::Video, true) => DownloadMode::VideoSnippet,
            (MediaKind::Audio, true) => DownloadMode::AudioSnippet,
            (MediaKind::Video, false) => DownloadMode::FullVideo,
            (MediaKind::Audio, false) => DownloadMode::Audio,
        }
    }
}

/// Result of a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    /// Final media file
    pub path: PathBuf,
    /// True when an existing file was returned without fetching
    pub reused: bool,
}
