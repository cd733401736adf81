//! YouTube link recognition, normalization and extraction from chat messages

use crate::types::{EntityKind, Message, MessageEntity, is_valid_video_id};
use regex::Regex;
use std::sync::LazyLock;

const VIDEO_PATTERN: &str = r"(https?://)?(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/(watch\?v=|embed/|shorts/|v/|.+\?v=)?([^&=%\?]{11})";

/// Video link anywhere in the input
static VIDEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VIDEO_PATTERN).expect("video URL pattern is valid"));

/// Video link at the start of the input
static VIDEO_URL_ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{})", VIDEO_PATTERN)).expect("anchored video URL pattern is valid")
});

static PLAYLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.|m\.|music\.)?youtube\.com/playlist\?(.*&)?list=[\w-]+")
        .expect("playlist URL pattern is valid")
});

/// Whether `link` contains a canonical video URL
pub fn is_video_url(link: &str) -> bool {
    VIDEO_URL.is_match(link)
}

/// Whether `candidate` starts with a video URL or is a playlist URL
pub fn is_supported_url(candidate: &str) -> bool {
    VIDEO_URL_ANCHORED.is_match(candidate) || PLAYLIST_URL.is_match(candidate)
}

/// Video id carried by a link, without any network access
pub fn extract_video_id(link: &str) -> Option<&str> {
    VIDEO_URL
        .captures(link)
        .and_then(|caps| caps.get(5))
        .map(|m| m.as_str())
        .filter(|id| is_valid_video_id(id))
}

/// Turn a link or bare id into the form handed to the tiers.
///
/// A bare id is prefixed with `base`. Everything from the first `&` is
/// dropped, which removes playlist and timestamp parameters from watch URLs.
pub fn normalize(link: &str, is_video_id: bool, base: &str) -> String {
    let link = link.trim();
    let full = if is_video_id {
        format!("{}{}", base, link)
    } else {
        link.to_string()
    };

    match full.split_once('&') {
        Some((head, _)) => head.to_string(),
        None => full,
    }
}

/// First YouTube link found in a message or the message it replies to
pub fn extract_url(message: &Message) -> Option<String> {
    std::iter::once(message)
        .chain(message.reply_to_message.as_deref())
        .find_map(url_in_message)
}

fn url_in_message(message: &Message) -> Option<String> {
    let body = message.body();
    message
        .all_entities()
        .filter_map(|entity| entity_target(entity, body))
        .find(|candidate| is_supported_url(candidate))
}

fn entity_target(entity: &MessageEntity, body: &str) -> Option<String> {
    match entity.kind {
        EntityKind::Url => entity.slice(body),
        EntityKind::TextLink => entity.url.as_ref().map(|u| u.trim().to_string()),
        EntityKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WATCH_BASE;
    use rstest::rstest;

    #[rstest]
    #[case("https://youtu.be/dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("http://youtube.com/watch?v=dQw4w9WgXcQ&t=42")]
    #[case("youtube.com/embed/dQw4w9WgXcQ")]
    #[case("https://m.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/shorts/dQw4w9WgXcQ")]
    #[case("see https://youtu.be/dQw4w9WgXcQ please")]
    fn test_video_urls_are_recognized(#[case] link: &str) {
        assert!(is_video_url(link));
        assert_eq!(extract_video_id(link), Some("dQw4w9WgXcQ"));
    }

    #[rstest]
    #[case("https://example.com/x")]
    #[case("")]
    #[case("dQw4w9WgXcQ")]
    #[case("https://vimeo.com/123456789")]
    #[case("https://youtu.be/short")]
    fn test_non_video_urls_are_rejected(#[case] link: &str) {
        assert!(!is_video_url(link));
    }

    #[test]
    fn test_playlist_url_is_supported_but_has_no_video_id() {
        let link = "https://www.youtube.com/playlist?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI";
        assert!(is_supported_url(link));
        assert_eq!(extract_video_id(link), None);
    }

    #[test]
    fn test_anchored_match_rejects_prefixed_text() {
        assert!(!is_supported_url("see https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_supported_url("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[rstest]
    #[case("dQw4w9WgXcQ", true, "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=RD&t=3",
        false,
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    )]
    #[case(" https://youtu.be/dQw4w9WgXcQ ", false, "https://youtu.be/dQw4w9WgXcQ")]
    fn test_normalize(#[case] input: &str, #[case] is_id: bool, #[case] expected: &str) {
        assert_eq!(normalize(input, is_id, WATCH_BASE), expected);
    }

    #[test]
    fn test_extract_text_link() {
        let message = Message::with_text("check this out").with_entity(MessageEntity::text_link(
            0,
            14,
            "https://youtu.be/abcdefghijk",
        ));
        assert_eq!(
            extract_url(&message).as_deref(),
            Some("https://youtu.be/abcdefghijk")
        );
    }

    #[test]
    fn test_extract_literal_url() {
        let message = Message::with_text("listen https://youtu.be/dQw4w9WgXcQ")
            .with_entity(MessageEntity::url(7, 28));
        assert_eq!(
            extract_url(&message).as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_skips_foreign_and_malformed_entities() {
        let message = Message::with_text("a https://example.com/x b")
            .with_entity(MessageEntity::url(2, 21))
            .with_entity(MessageEntity::url(10, 500))
            .with_entity(MessageEntity {
                kind: EntityKind::TextLink,
                offset: 0,
                length: 1,
                url: None,
            });
        assert_eq!(extract_url(&message), None);
    }

    #[test]
    fn test_extract_prefers_primary_then_reply() {
        let reply = Message::with_text("old").with_entity(MessageEntity::text_link(
            0,
            3,
            "https://youtu.be/aaaaaaaaaaa",
        ));
        let primary = Message::with_text("new")
            .with_entity(MessageEntity::text_link(
                0,
                3,
                "https://youtu.be/bbbbbbbbbbb",
            ))
            .replying_to(reply.clone());
        assert_eq!(
            extract_url(&primary).as_deref(),
            Some("https://youtu.be/bbbbbbbbbbb")
        );

        let bare = Message::with_text("what is this?").replying_to(reply);
        assert_eq!(
            extract_url(&bare).as_deref(),
            Some("https://youtu.be/aaaaaaaaaaa")
        );
    }

    #[test]
    fn test_extract_from_caption_entities() {
        let message = Message {
            caption: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            caption_entities: vec![MessageEntity::url(0, 28)],
            ..Message::default()
        };
        assert_eq!(
            extract_url(&message).as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }
}
