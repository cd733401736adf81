//! Link resolution
//!
//! This module contains the resolver and the components it is built from:
//! request spacing, user-agent rotation, link handling, the three metadata
//! tiers and the download executor.

pub mod download;
pub mod extractor;
pub mod identity;
pub mod links;
pub mod manager;
pub mod proxy;
pub mod rate_limiter;
pub mod search;
pub mod tiers;

pub use download::DownloadExecutor;
pub use extractor::{ExtractOptions, ExtractedInfo, MediaExtractor, OptionProfiles, YtDlp};
pub use identity::UserAgentPool;
pub use manager::{ResolverGeneric, YouTubeResolver};
pub use proxy::{InstanceRotation, ProxyClient};
pub use rate_limiter::RateLimiter;
pub use search::{SearchClient, SearchHit};
pub use tiers::{ExtractorTier, ProxyTier, ResolveStrategy, SearchTier};
