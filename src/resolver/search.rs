//! Innertube search integration
//!
//! The first resolution tier: a single `search` request against YouTube's
//! internal API, keyed by the normalized link, parsed into video renderers.

use crate::Result;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Search filter restricting results to videos
const VIDEO_FILTER_PARAMS: &str = "EgIQAQ==";

/// One video hit from the search index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub title: Option<String>,
    /// Human duration such as `3:33`, absent for live streams
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
}

/// Innertube search client
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// HTTP client
    client: Client,
    /// Base URL for the Innertube API
    base_url: String,
    /// WEB client version reported in the request context
    client_version: String,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        client_version: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_version: client_version.into(),
            timeout,
        }
    }

    /// Search for `query`, returning at most `limit` video hits in rank order
    pub async fn search(&self, query: &str, limit: usize, user_agent: &str) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": self.client_version,
                    "hl": "en",
                    "gl": "US",
                }
            },
            "query": query,
            "params": VIDEO_FILTER_PARAMS,
        });

        tracing::debug!("Searching Innertube for {:?}", query);

        let response = self
            .client
            .post(&url)
            .query(&[("prettyPrint", "false")])
            .header(USER_AGENT, user_agent)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let results: WebSearch = response.json().await?;
        let hits: Vec<SearchHit> = results.video_hits().take(limit).collect();

        tracing::debug!("Innertube returned {} video hit(s)", hits.len());
        Ok(hits)
    }
}

// Response shape, reduced to the fields the resolver reads.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebSearch {
    #[serde(default)]
    contents: Option<Contents>,
}

impl WebSearch {
    fn video_hits(self) -> impl Iterator<Item = SearchHit> {
        self.contents
            .and_then(|c| c.two_column_search_results_renderer)
            .map(|r| r.primary_contents.section_list_renderer.contents)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|section| section.item_section_renderer)
            .flat_map(|section| section.contents)
            .filter_map(|item| item.video_renderer)
            .map(VideoRenderer::into_hit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contents {
    two_column_search_results_renderer: Option<TwoColumnSearchResultsRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwoColumnSearchResultsRenderer {
    primary_contents: PrimaryContents,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryContents {
    section_list_renderer: SectionListRenderer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionListRenderer {
    #[serde(default)]
    contents: Vec<Section>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    item_section_renderer: Option<ItemSectionRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSectionRenderer {
    #[serde(default)]
    contents: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    video_renderer: Option<VideoRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRenderer {
    video_id: String,
    title: Option<Text>,
    length_text: Option<Text>,
    thumbnail: Option<Thumbnails>,
}

impl VideoRenderer {
    fn into_hit(self) -> SearchHit {
        SearchHit {
            id: self.video_id,
            title: self.title.and_then(Text::into_string),
            duration: self.length_text.and_then(Text::into_string),
            thumbnail: self
                .thumbnail
                .and_then(|t| t.thumbnails.into_iter().next())
                .map(|t| t.url),
        }
    }
}

/// Innertube text node: either `simpleText` or a list of runs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Text {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<Run>,
}

impl Text {
    fn into_string(self) -> Option<String> {
        match self.simple_text {
            Some(text) => Some(text),
            None if !self.runs.is_empty() => {
                Some(self.runs.into_iter().map(|r| r.text).collect::<String>())
            }
            None => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Run {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}
