//! Conversation record and title derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;

/// Title given to a conversation before its first user message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum title length in characters, truncation marker included.
pub const TITLE_MAX_CHARS: usize = 30;

const TRUNCATION_MARKER: &str = "...";

/// A titled, ordered list of messages.
///
/// Serialized as `{id, title, messages: [{role, content}], createdAt}` with
/// `createdAt` in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at,
        }
    }

    /// Whether any user message has been appended yet.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    /// Append a message, deriving the title from the first user message.
    ///
    /// Returns `true` when the title was rewritten.
    pub fn append(&mut self, message: Message) -> bool {
        let retitle = message.is_user() && !self.has_user_message();
        if retitle {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        retitle
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Build a conversation title from message content.
///
/// Content up to [`TITLE_MAX_CHARS`] characters is used as is. Longer content
/// keeps its leading characters and ends in `...`, for a total of exactly
/// `TITLE_MAX_CHARS` characters.
pub fn derive_title(content: &str) -> String {
    if content.chars().count() <= TITLE_MAX_CHARS {
        return content.to_string();
    }
    let keep = TITLE_MAX_CHARS - TRUNCATION_MARKER.len();
    let mut title: String = content.chars().take(keep).collect();
    title.push_str(TRUNCATION_MARKER);
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn conversation() -> Conversation {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        Conversation::new("c1", DEFAULT_TITLE, created_at)
    }

    #[test]
    fn long_content_is_truncated_with_marker() {
        let title = derive_title("Hello there, how are you doing today my friend");
        assert_eq!(title, "Hello there, how are you do...");
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn thirty_characters_fit_without_marker() {
        let content = "a".repeat(30);
        assert_eq!(derive_title(&content), content);
    }

    #[test]
    fn thirty_one_characters_get_marker() {
        let content = "b".repeat(31);
        assert_eq!(derive_title(&content), format!("{}...", "b".repeat(27)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(40);
        let title = derive_title(&content);
        assert_eq!(title, format!("{}...", "é".repeat(27)));
    }

    #[test]
    fn first_user_message_sets_title_once() {
        let mut conv = conversation();
        assert!(!conv.append(Message::assistant("Welcome!")));
        assert_eq!(conv.title, DEFAULT_TITLE);

        assert!(conv.append(Message::user("What is the price?")));
        assert_eq!(conv.title, "What is the price?");

        assert!(!conv.append(Message::user("And when do you launch?")));
        assert_eq!(conv.title, "What is the price?");
        assert_eq!(conv.messages.len(), 3);
    }

    #[test]
    fn serializes_created_at_as_millis() {
        let value = serde_json::to_value(conversation()).unwrap();
        assert_eq!(value["createdAt"], 1_700_000_000_123_i64);
        assert_eq!(value["title"], DEFAULT_TITLE);
        assert!(value["messages"].as_array().unwrap().is_empty());
    }
}
