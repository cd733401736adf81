//! Resolution strategies tried in order by the resolver

use crate::resolver::extractor::{MediaExtractor, OptionProfiles};
use crate::resolver::identity::UserAgentPool;
use crate::resolver::proxy::ProxyClient;
use crate::resolver::search::SearchClient;
use crate::types::VideoRef;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// One way of turning a normalized link into a [`VideoRef`]
#[async_trait]
pub trait ResolveStrategy: Send + Sync + std::fmt::Debug {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether this strategy should run given the previous strategy's
    /// failure, if any
    fn accepts(&self, _previous: Option<&Error>) -> bool {
        true
    }

    async fn resolve(&self, link: &str) -> Result<VideoRef>;
}

/// Search-index lookup limited to the top hit
#[derive(Debug)]
pub struct SearchTier {
    client: SearchClient,
    identity: Arc<UserAgentPool>,
}

impl SearchTier {
    pub fn new(client: SearchClient, identity: Arc<UserAgentPool>) -> Self {
        Self { client, identity }
    }
}

#[async_trait]
impl ResolveStrategy for SearchTier {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn resolve(&self, link: &str) -> Result<VideoRef> {
        let hit = self
            .client
            .search(link, 1, self.identity.pick())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("Search returned no videos"))?;

        // Signed thumbnail parameters expire; keep the bare URL
        let thumbnail = hit
            .thumbnail
            .as_deref()
            .and_then(|t| t.split('?').next());

        Ok(
            VideoRef::new(hit.id, hit.title.unwrap_or_else(|| "Unknown Title".to_string()))?
                .with_duration_text(hit.duration.as_deref())
                .with_thumbnail(thumbnail),
        )
    }
}

/// Full metadata extraction through the media extractor
#[derive(Debug)]
pub struct ExtractorTier<E> {
    extractor: Arc<E>,
    profiles: OptionProfiles,
    identity: Arc<UserAgentPool>,
}

impl<E: MediaExtractor> ExtractorTier<E> {
    pub fn new(extractor: Arc<E>, profiles: OptionProfiles, identity: Arc<UserAgentPool>) -> Self {
        Self {
            extractor,
            profiles,
            identity,
        }
    }
}

#[async_trait]
impl<E: MediaExtractor> ResolveStrategy for ExtractorTier<E> {
    fn name(&self) -> &'static str {
        "extractor"
    }

    async fn resolve(&self, link: &str) -> Result<VideoRef> {
        let options = self.profiles.audio(self.identity.pick(), None);
        let info = self
            .extractor
            .extract_info(link, &options)
            .await?
            .into_first_entry()?;

        let id = info
            .id
            .ok_or_else(|| Error::not_found("Extractor result has no video id"))?;
        let title = info.title.unwrap_or_else(|| "Unknown Title".to_string());

        Ok(VideoRef::new(id, title)?
            .with_duration_secs(info.duration.unwrap_or(0))
            .with_thumbnail(info.thumbnail.as_deref()))
    }
}

/// Invidious mirror search, only for content that demands a signed-in session
#[derive(Debug)]
pub struct ProxyTier {
    client: ProxyClient,
    identity: Arc<UserAgentPool>,
}

impl ProxyTier {
    pub fn new(client: ProxyClient, identity: Arc<UserAgentPool>) -> Self {
        Self { client, identity }
    }
}

#[async_trait]
impl ResolveStrategy for ProxyTier {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn accepts(&self, previous: Option<&Error>) -> bool {
        previous.is_some_and(Error::is_sign_in_required)
    }

    async fn resolve(&self, link: &str) -> Result<VideoRef> {
        self.client
            .search(link, self.identity.pick())
            .await
            .ok_or_else(|| Error::not_found("No proxy mirror returned a video"))
    }
}
