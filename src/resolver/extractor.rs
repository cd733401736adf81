//! Media extractor integration
//!
//! [`MediaExtractor`] is the seam between the resolver and the tool that talks
//! to YouTube. The production implementation, [`YtDlp`], drives the `yt-dlp`
//! binary as an async subprocess; tests substitute their own implementation.

use crate::config::settings::ExtractorSettings;
use crate::types::serde_helpers::deserialize_flexible_seconds;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;

/// Audio post-processing applied after download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: String,
    pub quality: String,
}

/// One extractor invocation's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub format: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Bytes per second
    pub rate_limit: Option<u64>,
    pub retries: Option<u32>,
    /// Seconds
    pub socket_timeout: Option<u64>,
    pub force_ipv4: bool,
    pub geo_bypass: bool,
    pub no_check_certificate: bool,
    pub no_playlist: bool,
    pub flat_playlist: bool,
    pub playlist_end: Option<usize>,
    pub output_template: Option<String>,
    pub audio: Option<AudioExtraction>,
    /// Container forced on merged or remuxed video
    pub container: Option<String>,
    pub proxy: Option<String>,
}

impl ExtractOptions {
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Command-line flags for `yt-dlp`
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["--quiet".into(), "--no-warnings".into()];

        let mut push = |flag: &str, value: Option<String>| {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value);
            }
        };
        push("--format", self.format.clone());
        push("--user-agent", self.user_agent.clone());
        push("--referer", self.referer.clone());
        push("--limit-rate", self.rate_limit.map(|r| r.to_string()));
        push("--retries", self.retries.map(|r| r.to_string()));
        push("--socket-timeout", self.socket_timeout.map(|t| t.to_string()));
        push("--playlist-end", self.playlist_end.map(|n| n.to_string()));
        push("--output", self.output_template.clone());
        push("--proxy", self.proxy.clone());

        if let Some(audio) = &self.audio {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                audio.codec.clone(),
                "--audio-quality".to_string(),
                audio.quality.clone(),
            ]);
        }
        if let Some(container) = &self.container {
            args.extend([
                "--merge-output-format".to_string(),
                container.clone(),
                "--remux-video".to_string(),
                container.clone(),
            ]);
        }

        let switches = [
            (self.force_ipv4, "--force-ipv4"),
            (self.geo_bypass, "--geo-bypass"),
            (self.no_check_certificate, "--no-check-certificates"),
            (self.no_playlist, "--no-playlist"),
            (self.flat_playlist, "--flat-playlist"),
        ];
        args.extend(
            switches
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );

        args
    }
}

/// Builds [`ExtractOptions`] for each operation from the configured defaults
#[derive(Debug, Clone)]
pub struct OptionProfiles {
    settings: ExtractorSettings,
    proxy: Option<String>,
}

impl OptionProfiles {
    pub fn new(settings: &ExtractorSettings, proxy: Option<&str>) -> Self {
        Self {
            settings: settings.clone(),
            proxy: proxy.map(String::from),
        }
    }

    /// Options shared by every single-video invocation
    pub fn base(&self, user_agent: &str) -> ExtractOptions {
        let s = &self.settings;
        ExtractOptions {
            user_agent: Some(user_agent.to_string()),
            referer: Some(s.referer.clone()).filter(|r| !r.is_empty()),
            rate_limit: Some(s.rate_limit_bytes).filter(|r| *r > 0),
            retries: Some(s.retries),
            socket_timeout: Some(s.socket_timeout_secs),
            force_ipv4: s.force_ipv4,
            geo_bypass: s.geo_bypass,
            no_check_certificate: s.no_check_certificate,
            no_playlist: true,
            proxy: self.proxy.clone(),
            ..ExtractOptions::default()
        }
    }

    /// Audio-first selection with conversion to the configured codec
    pub fn audio(&self, user_agent: &str, format_id: Option<&str>) -> ExtractOptions {
        let mut options = self
            .base(user_agent)
            .with_format(format_id.unwrap_or("bestaudio/best"));
        options.audio = Some(AudioExtraction {
            codec: self.settings.audio_codec.clone(),
            quality: self.settings.audio_quality.clone(),
        });
        options
    }

    /// Combined audio and video capped at the configured height
    pub fn video(&self, user_agent: &str, format_id: Option<&str>) -> ExtractOptions {
        let format = match format_id {
            Some(id) => id.to_string(),
            None => self.default_video_format(),
        };
        self.base(user_agent).with_format(format)
    }

    /// Flat listing of at most `limit` playlist entries
    pub fn flat_playlist(&self, user_agent: &str, limit: usize) -> ExtractOptions {
        ExtractOptions {
            user_agent: Some(user_agent.to_string()),
            flat_playlist: true,
            playlist_end: Some(limit),
            proxy: self.proxy.clone(),
            ..ExtractOptions::default()
        }
    }

    /// Extension of files produced by the audio profile
    pub fn audio_extension(&self) -> &'static str {
        audio_extension(&self.settings.audio_codec).unwrap_or("mp3")
    }

    fn default_video_format(&self) -> String {
        let height = self.settings.max_video_height;
        format!(
            "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
            h = height
        )
    }
}

/// Requested format of a merged selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestedFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Metadata returned by the extractor for a video or playlist
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_seconds")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Direct stream URL of a single-format selection
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub requested_formats: Option<Vec<RequestedFormat>>,
    /// Present when the link was a playlist
    #[serde(default)]
    pub entries: Option<Vec<ExtractedInfo>>,
}

impl ExtractedInfo {
    /// The first entry of a playlist result, or the result itself
    pub fn into_first_entry(self) -> Result<Self> {
        match self.entries {
            Some(entries) => entries
                .into_iter()
                .next()
                .ok_or_else(|| Error::not_found("Extractor returned an empty entry list")),
            None => Ok(self),
        }
    }

    /// Direct stream URL, falling back to the first requested format
    pub fn stream_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty()).or_else(|| {
            self.requested_formats
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find_map(|f| f.url.as_deref().filter(|u| !u.is_empty()))
        })
    }

    /// Ids of the listed entries in source order, skipping entries without one
    pub fn entry_ids(&self) -> Vec<String> {
        self.entries
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|e| e.id.as_deref())
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Tool that can resolve metadata for and download a link
#[async_trait]
pub trait MediaExtractor: Send + Sync + std::fmt::Debug {
    /// Fetch metadata without downloading
    async fn extract_info(&self, link: &str, options: &ExtractOptions) -> Result<ExtractedInfo>;

    /// Download media according to `options`.
    ///
    /// Returns the path of the file written when the tool reports it.
    async fn download(&self, link: &str, options: &ExtractOptions) -> Result<Option<PathBuf>>;
}

/// `yt-dlp` subprocess driver
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    /// Bounds the number of concurrently running processes
    permits: Arc<Semaphore>,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            binary: binary.into(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn from_settings(settings: &ExtractorSettings) -> Self {
        Self::new(settings.binary.clone(), settings.max_concurrent)
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::internal("Extractor pool is closed"))?;

        tracing::debug!("Running {} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::extractor(format!("Failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extractor(error_summary(&stderr, output.status)));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn extract_info(&self, link: &str, options: &ExtractOptions) -> Result<ExtractedInfo> {
        let mut args = options.to_args();
        args.extend(["--dump-single-json".to_string(), "--".to_string(), link.to_string()]);

        let stdout = self.run(args).await?;
        let info: Option<ExtractedInfo> = serde_json::from_slice(&stdout)?;
        info.ok_or_else(|| Error::extractor("No video info returned"))
    }

    async fn download(&self, link: &str, options: &ExtractOptions) -> Result<Option<PathBuf>> {
        let mut args = options.to_args();
        args.extend([
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--".to_string(),
            link.to_string(),
        ]);

        let stdout = self.run(args).await?;
        Ok(reported_path(&stdout))
    }
}

/// File extension `yt-dlp --audio-format <codec>` produces, for the codecs
/// it can convert to
pub fn audio_extension(codec: &str) -> Option<&'static str> {
    match codec {
        "mp3" => Some("mp3"),
        "aac" | "m4a" | "alac" => Some("m4a"),
        "opus" => Some("opus"),
        "vorbis" => Some("ogg"),
        "flac" => Some("flac"),
        "wav" => Some("wav"),
        _ => None,
    }
}

/// Final file path printed by `--print after_move:filepath`
fn reported_path(stdout: &[u8]) -> Option<PathBuf> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Condense yt-dlp's stderr into one message, preferring its `ERROR:` lines
fn error_summary(stderr: &str, status: std::process::ExitStatus) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("ERROR:"))
        .map(str::trim)
        .collect();

    if !errors.is_empty() {
        errors.join("; ")
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        format!("yt-dlp exited with {}", status)
    }
}
