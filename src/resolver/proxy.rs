//! Invidious mirror fallback
//!
//! Provides:
//! - Mirror list ordering ([`InstanceRotation`]) under a configurable policy
//! - A search client that walks the mirrors until one yields a video

use crate::config::RotationPolicy;
use crate::types::VideoRef;
use crate::types::serde_helpers::deserialize_flexible_seconds;
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Ordered mirror list with a cursor
#[derive(Debug)]
pub struct InstanceRotation {
    instances: Vec<String>,
    cursor: AtomicUsize,
    policy: RotationPolicy,
}

impl InstanceRotation {
    pub fn new(instances: Vec<String>, policy: RotationPolicy) -> Self {
        Self {
            instances: instances
                .into_iter()
                .map(|i| i.trim().trim_end_matches('/').to_string())
                .filter(|i| !i.is_empty())
                .collect(),
            cursor: AtomicUsize::new(0),
            policy,
        }
    }

    /// Mirrors in the order the next fallback should try them, with their
    /// position in the configured list
    pub fn order(&self) -> Vec<(usize, &str)> {
        let len = self.instances.len();
        if len == 0 {
            return Vec::new();
        }

        let start = match self.policy {
            RotationPolicy::First => 0,
            RotationPolicy::RoundRobin => self.cursor.load(Ordering::Relaxed) % len,
        };

        (0..len)
            .map(|offset| {
                let index = (start + offset) % len;
                (index, self.instances[index].as_str())
            })
            .collect()
    }

    /// Record that the mirror at `index` answered
    pub fn mark_success(&self, index: usize) {
        if self.policy == RotationPolicy::RoundRobin && !self.instances.is_empty() {
            self.cursor
                .store((index + 1) % self.instances.len(), Ordering::Relaxed);
        }
    }
}

/// One item of an Invidious search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_seconds")]
    length_seconds: Option<u64>,
}

/// Searches Invidious mirrors in rotation order
#[derive(Debug)]
pub struct ProxyClient {
    client: Client,
    rotation: InstanceRotation,
    /// Per-mirror request timeout
    timeout: Duration,
}

impl ProxyClient {
    pub fn new(client: Client, rotation: InstanceRotation, timeout: Duration) -> Self {
        Self {
            client,
            rotation,
            timeout,
        }
    }

    /// First video any mirror returns for `query`; `None` when every mirror
    /// fails or has no video result
    pub async fn search(&self, query: &str, user_agent: &str) -> Option<VideoRef> {
        let order = self.rotation.order();
        let tried = order.len();

        for (index, base) in order {
            match self.search_instance(base, query, user_agent).await {
                Ok(Some(video)) => {
                    tracing::info!("Proxy mirror {} resolved {}", base, video.id());
                    self.rotation.mark_success(index);
                    return Some(video);
                }
                Ok(None) => {
                    tracing::warn!("Proxy mirror {} returned no video results", base);
                }
                Err(e) => {
                    tracing::warn!("Proxy mirror {} failed: {}", base, e);
                }
            }
        }

        tracing::warn!(
            "All {} proxy mirrors failed for {:?}",
            tried,
            query
        );
        None
    }

    async fn search_instance(
        &self,
        base: &str,
        query: &str,
        user_agent: &str,
    ) -> Result<Option<VideoRef>> {
        let url = Url::parse_with_params(&format!("{}/api/v1/search", base), &[("q", query)])
            .map_err(|e| Error::config(format!("Invalid mirror URL {}: {}", base, e)))?;

        tracing::debug!("Querying proxy mirror {}", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::not_found(format!("HTTP {}", status)));
        }

        let items: Vec<SearchItem> = response.json().await?;
        items
            .into_iter()
            .find(|item| item.kind == "video" && item.video_id.is_some())
            .map(into_video_ref)
            .transpose()
    }
}

fn into_video_ref(item: SearchItem) -> Result<VideoRef> {
    let id = item.video_id.unwrap_or_default();
    let title = item.title.unwrap_or_else(|| "Unknown Title".to_string());
    Ok(VideoRef::new(id, title)?.with_duration_secs(item.length_seconds.unwrap_or(0)))
}
