//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the resolver.

use crate::resolver::extractor::audio_extension;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for resolver-specific overrides
pub const ENV_PREFIX: &str = "YT_RESOLVER_";

/// Main configuration settings for the resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// YouTube endpoints
    pub youtube: YoutubeSettings,
    /// Request spacing
    pub rate_limit: RateLimitSettings,
    /// yt-dlp invocation
    pub extractor: ExtractorSettings,
    /// Invidious mirror fallback
    pub proxy: ProxySettings,
    /// Local media storage
    pub download: DownloadSettings,
    /// Outbound proxy configuration
    pub network: NetworkSettings,
    /// Shared HTTP client configuration
    pub http: HttpSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// YouTube endpoints and canonical link bases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Prefix turning a bare video id into a watch URL
    pub watch_base: String,
    /// Prefix turning a bare playlist id into a playlist URL
    pub playlist_base: String,
    /// Innertube API root used by the search tier
    pub search_endpoint: String,
    /// WEB client version reported to Innertube
    pub search_client_version: String,
}

/// Jittered request spacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Delay enforced before the first redraw, in seconds
    pub initial_delay_secs: f64,
    /// Lower bound of the redrawn delay, in seconds
    pub min_delay_secs: f64,
    /// Upper bound of the redrawn delay, in seconds
    pub max_delay_secs: f64,
}

/// yt-dlp configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Path or name of the yt-dlp binary
    pub binary: PathBuf,
    /// Socket timeout passed to yt-dlp, in seconds
    pub socket_timeout_secs: u64,
    /// Retry count passed to yt-dlp
    pub retries: u32,
    /// Download rate cap in bytes per second
    pub rate_limit_bytes: u64,
    /// Referer header sent by yt-dlp
    pub referer: String,
    /// Force IPv4 connections
    pub force_ipv4: bool,
    /// Bypass geographic restrictions
    pub geo_bypass: bool,
    /// Skip TLS certificate validation
    pub no_check_certificate: bool,
    /// Codec for extracted audio; also decides the audio file extension
    pub audio_codec: String,
    /// Quality for extracted audio
    pub audio_quality: String,
    /// Height ceiling for video selection
    pub max_video_height: u32,
    /// Maximum number of concurrent yt-dlp processes
    pub max_concurrent: usize,
    /// User-agent pool; empty means the built-in pool
    pub user_agents: Vec<String>,
}

/// Mirror cursor policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Every fallback starts at the first mirror
    #[default]
    First,
    /// Start at the mirror after the one that last answered
    RoundRobin,
}

impl std::str::FromStr for RotationPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "round_robin" | "round-robin" => Ok(Self::RoundRobin),
            other => Err(crate::Error::config(format!(
                "Invalid rotation policy: {}",
                other
            ))),
        }
    }
}

/// Invidious mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Mirror base URLs, in preference order
    pub instances: Vec<String>,
    /// Per-mirror request timeout, in seconds
    pub timeout_secs: u64,
    /// Cursor policy across fallbacks
    pub rotation: RotationPolicy,
}

/// Local media storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory receiving downloaded media
    pub directory: PathBuf,
}

/// Outbound proxy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub https_proxy: Option<String>,
    pub http_proxy: Option<String>,
    pub all_proxy: Option<String>,
}

/// Shared HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Default request timeout, in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            watch_base: "https://www.youtube.com/watch?v=".to_string(),
            playlist_base: "https://youtube.com/playlist?list=".to_string(),
            search_endpoint: "https://www.youtube.com/youtubei/v1".to_string(),
            search_client_version: "2.20240726.00.00".to_string(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            initial_delay_secs: 2.0,
            min_delay_secs: 1.5,
            max_delay_secs: 2.5,
        }
    }
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            socket_timeout_secs: 30,
            retries: 3,
            rate_limit_bytes: 1_048_576,
            referer: "https://www.youtube.com/".to_string(),
            force_ipv4: true,
            geo_bypass: true,
            no_check_certificate: true,
            audio_codec: "mp3".to_string(),
            audio_quality: "192".to_string(),
            max_video_height: 720,
            max_concurrent: 4,
            user_agents: Vec::new(),
        }
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            instances: [
                "https://yewtu.be",
                "https://inv.odyssey346.dev",
                "https://invidious.flokinet.to",
                "https://vid.puffyan.us",
                "https://inv.tux.pizza",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            timeout_secs: 10,
            rotation: RotationPolicy::First,
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("downloads"),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl ProxySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables on top of the defaults
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            crate::Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Apply environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Some(binary) = env_var("YTDLP_PATH") {
            self.extractor.binary = PathBuf::from(binary);
        }

        if let Some(dir) = env_var("DOWNLOAD_DIR") {
            self.download.directory = PathBuf::from(dir);
        }

        if let Some(endpoint) = env_var("SEARCH_ENDPOINT") {
            self.youtube.search_endpoint = endpoint;
        }

        if let Some(instances) = env_var("PROXY_INSTANCES") {
            self.proxy.instances = instances
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(timeout) = env_var("PROXY_TIMEOUT") {
            self.proxy.timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid proxy timeout: {}", e)))?;
        }

        if let Some(rotation) = env_var("PROXY_ROTATION") {
            self.proxy.rotation = rotation.parse()?;
        }

        if let Some(max) = env_var("MAX_CONCURRENT") {
            self.extractor.max_concurrent = max
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid max concurrency: {}", e)))?;
        }

        if let Some(level) = env_var("LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }
        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }

        Ok(self)
    }

    /// Reject configurations the resolver cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let rl = &self.rate_limit;
        if rl.min_delay_secs < 0.0 || rl.initial_delay_secs < 0.0 {
            return Err(crate::Error::config("Rate limit delays must be non-negative"));
        }
        if rl.min_delay_secs > rl.max_delay_secs {
            return Err(crate::Error::config(format!(
                "Rate limit range is inverted: {} > {}",
                rl.min_delay_secs, rl.max_delay_secs
            )));
        }
        if self.proxy.instances.is_empty() {
            return Err(crate::Error::config("At least one proxy instance is required"));
        }
        if self.proxy.timeout_secs == 0 || self.http.timeout_secs == 0 {
            return Err(crate::Error::config("Timeouts must be greater than zero"));
        }
        if self.extractor.binary.as_os_str().is_empty() {
            return Err(crate::Error::config("Extractor binary path is empty"));
        }
        if audio_extension(&self.extractor.audio_codec).is_none() {
            return Err(crate::Error::config(format!(
                "Unsupported audio codec: {}",
                self.extractor.audio_codec
            )));
        }
        if self.extractor.max_concurrent == 0 {
            return Err(crate::Error::config("Extractor concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Outbound proxy, HTTPS first, then HTTP, then ALL_PROXY
    pub fn get_proxy_url(&self) -> Option<&str> {
        self.network
            .https_proxy
            .as_deref()
            .or(self.network.http_proxy.as_deref())
            .or(self.network.all_proxy.as_deref())
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, suffix))
        .ok()
        .filter(|v| !v.trim().is_empty())
}
