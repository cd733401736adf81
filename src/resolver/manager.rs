//! Resolver orchestration
//!
//! [`ResolverGeneric`] owns the shared state (rate limiter, user-agent pool,
//! HTTP client, extractor) and exposes the six operations callers use.

use crate::config::Settings;
use crate::resolver::download::DownloadExecutor;
use crate::resolver::extractor::{MediaExtractor, OptionProfiles, YtDlp};
use crate::resolver::identity::UserAgentPool;
use crate::resolver::links;
use crate::resolver::proxy::{InstanceRotation, ProxyClient};
use crate::resolver::rate_limiter::RateLimiter;
use crate::resolver::search::SearchClient;
use crate::resolver::tiers::{ExtractorTier, ProxyTier, ResolveStrategy, SearchTier};
use crate::types::{DownloadOutcome, DownloadSpec, Message, Resolution, VideoRef};
use crate::{Error, Result};
use reqwest::Client;
use std::sync::Arc;

/// Convenience type alias for the resolver backed by `yt-dlp`
pub type YouTubeResolver = ResolverGeneric<YtDlp>;

/// Resolves YouTube links through a chain of fallback tiers
#[derive(Debug)]
pub struct ResolverGeneric<E: MediaExtractor = YtDlp> {
    /// Configuration settings
    settings: Arc<Settings>,
    /// Spacing for every outbound operation
    limiter: RateLimiter,
    identity: Arc<UserAgentPool>,
    extractor: Arc<E>,
    profiles: OptionProfiles,
    /// Metadata tiers in fallback order
    tiers: Vec<Box<dyn ResolveStrategy>>,
    downloads: DownloadExecutor<E>,
}

impl ResolverGeneric<YtDlp> {
    /// Creates a resolver driving the configured `yt-dlp` binary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yt_resolver::config::Settings;
    /// use yt_resolver::resolver::YouTubeResolver;
    ///
    /// let resolver = YouTubeResolver::new(Settings::default()).unwrap();
    /// assert!(resolver.exists("https://youtu.be/dQw4w9WgXcQ", false));
    /// ```
    pub fn new(settings: Settings) -> Result<Self> {
        let extractor = YtDlp::from_settings(&settings.extractor);
        Self::with_extractor(settings, Arc::new(extractor))
    }
}

impl<E: MediaExtractor + 'static> ResolverGeneric<E> {
    /// Creates a resolver around a custom extractor
    pub fn with_extractor(settings: Settings, extractor: Arc<E>) -> Result<Self> {
        settings.validate()?;

        let http_client = build_http_client(&settings)?;
        let identity = Arc::new(UserAgentPool::new(&settings.extractor.user_agents));
        let profiles = OptionProfiles::new(&settings.extractor, settings.get_proxy_url());

        let search = SearchClient::new(
            http_client.clone(),
            settings.youtube.search_endpoint.clone(),
            settings.youtube.search_client_version.clone(),
            settings.http.timeout(),
        );
        let mirrors = ProxyClient::new(
            http_client,
            InstanceRotation::new(settings.proxy.instances.clone(), settings.proxy.rotation),
            settings.proxy.timeout(),
        );

        let tiers: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(SearchTier::new(search, Arc::clone(&identity))),
            Box::new(ExtractorTier::new(
                Arc::clone(&extractor),
                profiles.clone(),
                Arc::clone(&identity),
            )),
            Box::new(ProxyTier::new(mirrors, Arc::clone(&identity))),
        ];

        let downloads = DownloadExecutor::new(
            Arc::clone(&extractor),
            profiles.clone(),
            settings.download.directory.clone(),
        );

        Ok(Self {
            limiter: RateLimiter::from_settings(&settings.rate_limit),
            settings: Arc::new(settings),
            identity,
            extractor,
            profiles,
            tiers,
            downloads,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// First YouTube link in a message or the message it replies to
    pub fn url(&self, message: &Message) -> Option<String> {
        links::extract_url(message)
    }

    /// Whether the link (or bare id) is a canonical video link. No network.
    pub fn exists(&self, link: &str, is_video_id: bool) -> bool {
        let link = if is_video_id {
            format!("{}{}", self.settings.youtube.watch_base, link.trim())
        } else {
            link.to_string()
        };
        links::is_video_url(&link)
    }

    /// Resolve video metadata, falling back tier by tier.
    ///
    /// Never fails: exhausted tiers become a failed [`Resolution`].
    pub async fn details(&self, link: &str, is_video_id: bool) -> Resolution<VideoRef> {
        self.limiter.throttle().await;

        let link = links::normalize(link, is_video_id, &self.settings.youtube.watch_base);
        if link.is_empty() {
            return Resolution::failed(format!(
                "Failed to process query: {}",
                Error::invalid_input("empty link")
            ));
        }

        match self.run_tiers(&link).await {
            Ok(video) => Resolution::found(video),
            Err(e) => {
                tracing::error!("Failed to resolve {}: {}", link, e);
                Resolution::failed(format!("Failed to process query: {}", e))
            }
        }
    }

    /// Direct stream URL for combined audio and video
    pub async fn video(&self, link: &str, is_video_id: bool) -> Resolution<String> {
        self.limiter.throttle().await;

        let link = links::normalize(link, is_video_id, &self.settings.youtube.watch_base);
        let options = self.profiles.video(self.identity.pick(), None);

        let info = match self.extractor.extract_info(&link, &options).await {
            Ok(info) => info.into_first_entry(),
            Err(e) => Err(e),
        };

        match info {
            Ok(info) => match info.stream_url() {
                Some(url) => Resolution::found(url.to_string()),
                None => Resolution::failed("No stream URL available"),
            },
            Err(e) => {
                tracing::error!("Error getting stream URL for {}: {}", link, e);
                Resolution::failed(format!("Error getting stream URL: {}", e))
            }
        }
    }

    /// Video ids of a playlist in source order, at most `limit`.
    ///
    /// Failures are logged and yield an empty list.
    pub async fn playlist(
        &self,
        link: &str,
        limit: usize,
        user_id: i64,
        is_video_id: bool,
    ) -> Vec<String> {
        self.limiter.throttle().await;

        let link = links::normalize(link, is_video_id, &self.settings.youtube.playlist_base);
        tracing::info!(user_id, limit, "Fetching playlist {}", link);

        if limit == 0 {
            return Vec::new();
        }

        let options = self.profiles.flat_playlist(self.identity.pick(), limit);
        match self.extractor.extract_info(&link, &options).await {
            Ok(info) => {
                let mut ids = info.entry_ids();
                ids.truncate(limit);
                tracing::debug!(user_id, "Playlist {} yielded {} id(s)", link, ids.len());
                ids
            }
            Err(e) => {
                tracing::error!(user_id, "Failed to fetch playlist {}: {}", link, e);
                Vec::new()
            }
        }
    }

    /// Download media to the download directory.
    ///
    /// The only operation that reports failure as `Err`.
    pub async fn download(&self, spec: &DownloadSpec) -> Result<DownloadOutcome> {
        self.limiter.throttle().await;

        let link = links::normalize(
            &spec.link,
            spec.is_video_id,
            &self.settings.youtube.watch_base,
        );
        if link.is_empty() {
            return Err(Error::download("Empty link"));
        }

        let outcome = self
            .downloads
            .download(&link, spec, self.identity.pick())
            .await;

        match &outcome {
            Ok(done) if done.reused => {
                tracing::info!("Download served from {}", done.path.display())
            }
            Ok(done) => tracing::info!("Downloaded {}", done.path.display()),
            Err(e) => tracing::error!("Download of {} failed: {}", link, e),
        }
        outcome
    }

    async fn run_tiers(&self, link: &str) -> Result<VideoRef> {
        let mut last_error: Option<Error> = None;

        for tier in &self.tiers {
            if !tier.accepts(last_error.as_ref()) {
                tracing::debug!("Skipping {} tier", tier.name());
                continue;
            }

            match tier.resolve(link).await {
                Ok(video) => {
                    tracing::info!("Resolved {} via {} tier", video.id(), tier.name());
                    return Ok(video.with_watch_base(&self.settings.youtube.watch_base));
                }
                Err(e) if e.is_terminal() => return Err(e),
                Err(e) => {
                    tracing::warn!("{} tier failed for {}: {}", tier.name(), link, e);
                    // An empty answer does not mask an earlier, more specific failure
                    last_error = match last_error {
                        Some(previous) if matches!(e, Error::NotFound(_)) => Some(previous),
                        _ => Some(e),
                    };
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::not_found("No tier produced a result")))
    }
}

fn build_http_client(settings: &Settings) -> Result<Client> {
    let mut builder = Client::builder().timeout(settings.http.timeout());

    // Proxy environment variables are already folded into the settings
    builder = match settings.get_proxy_url() {
        Some(proxy_url) => {
            tracing::debug!("Using outbound proxy {}", proxy_url);
            builder.proxy(reqwest::Proxy::all(proxy_url)?)
        }
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}
