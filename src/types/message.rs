//! Minimal chat message model used for link extraction
//!
//! Shaped after the Telegram Bot API so messages can be deserialized straight
//! from update JSON.

use serde::{Deserialize, Serialize};

/// Kind of a text entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A URL written literally in the text
    Url,
    /// Text hyperlinked to a URL
    TextLink,
    /// Anything else (mentions, formatting, ...)
    #[serde(other)]
    Other,
}

/// An offset-addressed span inside message text.
///
/// Offsets and lengths count UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    /// Target of a text link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MessageEntity {
    /// A literal URL span
    pub fn url(offset: usize, length: usize) -> Self {
        Self {
            kind: EntityKind::Url,
            offset,
            length,
            url: None,
        }
    }

    /// A hyperlinked span
    pub fn text_link(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::TextLink,
            offset,
            length,
            url: Some(url.into()),
        }
    }

    /// The text this entity covers, or `None` if the range falls outside
    /// `text` or splits a surrogate pair.
    pub fn slice(&self, text: &str) -> Option<String> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let end = self.offset.checked_add(self.length)?;
        let span = units.get(self.offset..end)?;
        String::from_utf16(span).ok()
    }
}

/// A chat message with its entities and optional replied-to message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    #[serde(default)]
    pub caption_entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// A plain text message
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Append an entity on the text
    pub fn with_entity(mut self, entity: MessageEntity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Attach the message this one replies to
    pub fn replying_to(mut self, message: Message) -> Self {
        self.reply_to_message = Some(Box::new(message));
        self
    }

    /// Text, else caption, else empty
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or_default()
    }

    /// Text entities followed by caption entities
    pub fn all_entities(&self) -> impl Iterator<Item = &MessageEntity> {
        self.entities.iter().chain(self.caption_entities.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_ascii() {
        let entity = MessageEntity::url(6, 28);
        assert_eq!(
            entity.slice("watch https://youtu.be/dQw4w9WgXcQ now").as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_slice_counts_utf16_units() {
        // The emoji is two UTF-16 units
        let text = "🎵 https://youtu.be/dQw4w9WgXcQ";
        let entity = MessageEntity::url(3, 28);
        assert_eq!(
            entity.slice(text).as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_slice_out_of_range() {
        assert_eq!(MessageEntity::url(4, 100).slice("short"), None);
        assert_eq!(MessageEntity::url(usize::MAX, 2).slice("short"), None);
    }

    #[test]
    fn test_deserialize_bot_api_message() {
        let json = serde_json::json!({
            "message_id": 42,
            "text": "look",
            "entities": [
                {"type": "text_link", "offset": 0, "length": 4, "url": "https://youtu.be/abcdefghijk"},
                {"type": "bold", "offset": 0, "length": 4}
            ],
            "reply_to_message": {"caption": "old", "caption_entities": []}
        });

        let message: Message = serde_json::from_value(json).unwrap();
        assert_eq!(message.entities[0].kind, EntityKind::TextLink);
        assert_eq!(message.entities[1].kind, EntityKind::Other);
        assert_eq!(message.reply_to_message.unwrap().body(), "old");
    }
}
