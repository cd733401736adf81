//! Normalized video metadata and the read-path result shape

use crate::utils::{format_duration, time_to_seconds};
use serde::Serialize;

/// Canonical watch URL prefix
pub const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

const THUMBNAIL_TEMPLATE: &str = "https://i.ytimg.com/vi/{id}/hqdefault.jpg";

/// Whether `id` has the shape of a YouTube video id: 11 characters from
/// `[A-Za-z0-9_-]`.
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Default thumbnail for a video id
pub fn thumbnail_for(id: &str) -> String {
    THUMBNAIL_TEMPLATE.replace("{id}", id)
}

/// Metadata for one video, identical in shape whichever tier produced it.
///
/// The id is validated on construction and the url is always derived from
/// it, so a `VideoRef` can never point somewhere its id does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRef {
    id: String,
    url: String,
    title: String,
    duration: Option<String>,
    duration_sec: u64,
    thumbnail: String,
}

impl VideoRef {
    /// Create a reference with the canonical watch URL and default thumbnail.
    ///
    /// A malformed id is [`Error::NotFound`](crate::Error::NotFound): the
    /// producer had no usable video, which is not the caller's fault.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if !is_valid_video_id(&id) {
            return Err(crate::Error::not_found(format!(
                "Not a video id: {:?}",
                id
            )));
        }

        Ok(Self {
            url: format!("{}{}", WATCH_BASE, id),
            thumbnail: thumbnail_for(&id),
            id,
            title: title.into(),
            duration: None,
            duration_sec: 0,
        })
    }

    /// Re-derive the url from a different watch base
    pub fn with_watch_base(mut self, base: &str) -> Self {
        self.url = format!("{}{}", base, self.id);
        self
    }

    /// Set the duration from a human string such as `3:33`.
    ///
    /// Unparseable text (`"None"`, `"LIVE"`) leaves `duration_sec` at 0.
    pub fn with_duration_text(mut self, text: Option<&str>) -> Self {
        let text = text.map(str::trim).filter(|t| !t.is_empty() && *t != "None");
        self.duration_sec = text.and_then(time_to_seconds).unwrap_or(0);
        self.duration = text.map(String::from);
        self
    }

    /// Set the duration from a second count; zero means unknown
    pub fn with_duration_secs(mut self, seconds: u64) -> Self {
        self.duration_sec = seconds;
        self.duration = (seconds > 0).then(|| format_duration(seconds));
        self
    }

    /// Override the thumbnail; empty values keep the default
    pub fn with_thumbnail(mut self, thumbnail: Option<&str>) -> Self {
        if let Some(url) = thumbnail.filter(|u| !u.is_empty()) {
            self.thumbnail = url.to_string();
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }
}

/// Outcome of a read operation: a value with an empty error, or no value
/// with a non-empty error. The constructors are the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution<T> {
    result: Option<T>,
    error: String,
}

impl<T> Resolution<T> {
    /// A successful resolution
    pub fn found(value: T) -> Self {
        Self {
            result: Some(value),
            error: String::new(),
        }
    }

    /// A failed resolution. An empty message is replaced so the error side
    /// is never blank.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            result: None,
            error: if message.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
        }
    }

    pub fn is_found(&self) -> bool {
        self.result.is_some()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Error message; empty on success
    pub fn error(&self) -> &str {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_video_ref_derives_url_and_thumbnail() {
        let video = VideoRef::new("dQw4w9WgXcQ", "Never Gonna Give You Up").unwrap();
        assert_eq!(video.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            video.thumbnail(),
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
        assert_eq!(video.duration(), None);
        assert_eq!(video.duration_sec(), 0);
    }

    #[test]
    fn test_video_ref_rejects_bad_ids() {
        let err = VideoRef::new("short", "x").unwrap_err();
        assert!(matches!(err, crate::Error::NotFound(_)));
        assert!(!err.is_terminal());
        assert!(VideoRef::new("dQw4w9WgXcQ?", "x").is_err());
        assert!(VideoRef::new("dQw4w9WgX.Q", "x").is_err());
    }

    #[test]
    fn test_duration_text() {
        let video = VideoRef::new("dQw4w9WgXcQ", "t")
            .unwrap()
            .with_duration_text(Some("3:33"));
        assert_eq!(video.duration(), Some("3:33"));
        assert_eq!(video.duration_sec(), 213);

        let video = VideoRef::new("dQw4w9WgXcQ", "t")
            .unwrap()
            .with_duration_text(Some("None"));
        assert_eq!(video.duration(), None);
        assert_eq!(video.duration_sec(), 0);
    }

    #[test]
    fn test_duration_secs() {
        let video = VideoRef::new("dQw4w9WgXcQ", "t")
            .unwrap()
            .with_duration_secs(3723);
        assert_eq!(video.duration(), Some("1:02:03"));
        assert_eq!(video.duration_sec(), 3723);
    }

    #[test]
    fn test_video_ref_serialization() {
        let video = VideoRef::new("dQw4w9WgXcQ", "t")
            .unwrap()
            .with_duration_secs(213);
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["id"], "dQw4w9WgXcQ");
        assert_eq!(json["duration"], "3:33");
        assert_eq!(json["duration_sec"], 213);
    }

    #[test]
    fn test_resolution_exclusivity() {
        let ok = Resolution::found(1);
        assert!(ok.is_found());
        assert!(ok.error().is_empty());

        let failed: Resolution<u8> = Resolution::failed("");
        assert!(!failed.is_found());
        assert_eq!(failed.error(), "Unknown error");

        let failed = Resolution::<u8>::failed("boom");
        assert_eq!(failed.value(), None);
        assert_eq!(failed.error(), "boom");
    }
}
