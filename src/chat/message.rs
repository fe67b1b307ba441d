//! Chat message model and payload normalization

use serde::{Deserialize, Serialize};

pub const ROLE_SYSTEM: &str = "system";

/// One conversation entry. Only `system` is special; any other role is forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }

    #[cfg(test)]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn is_system(&self) -> bool {
        self.role == ROLE_SYSTEM
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Prepend the default system message unless the conversation already has one.
///
/// Existing order is untouched; applying this twice is the same as once.
pub fn ensure_system_message(messages: &mut Vec<ChatMessage>, system_prompt: &str) {
    if !messages.iter().any(ChatMessage::is_system) {
        messages.insert(0, ChatMessage::system(system_prompt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "be brief";

    #[test]
    fn test_prepends_system_before_user() {
        let mut messages = vec![ChatMessage::user("hi")];
        ensure_system_message(&mut messages, PROMPT);
        assert_eq!(
            messages,
            vec![ChatMessage::system(PROMPT), ChatMessage::user("hi")]
        );
    }

    #[test]
    fn test_existing_system_anywhere_left_unchanged() {
        let original = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::system("custom rules"),
            ChatMessage::user("again"),
        ];
        let mut messages = original.clone();
        ensure_system_message(&mut messages, PROMPT);
        assert_eq!(messages, original);
    }

    #[test]
    fn test_empty_conversation_gets_system_only() {
        let mut messages = Vec::new();
        ensure_system_message(&mut messages, PROMPT);
        assert_eq!(messages, vec![ChatMessage::system(PROMPT)]);
    }

    #[test]
    fn test_applied_at_most_once() {
        let mut messages = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        ensure_system_message(&mut messages, PROMPT);
        ensure_system_message(&mut messages, PROMPT);
        assert_eq!(messages.iter().filter(|m| m.is_system()).count(), 1);
        assert_eq!(messages[1], ChatMessage::user("a"));
        assert_eq!(messages[2], ChatMessage::assistant("b"));
    }

    #[test]
    fn test_payload_messages_default_to_empty() {
        let payload: ChatPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.messages.is_empty());
    }

    #[test]
    fn test_payload_keeps_unknown_roles() {
        let payload: ChatPayload =
            serde_json::from_str(r#"{"messages":[{"role":"tool","content":"42"}]}"#).unwrap();
        assert_eq!(payload.messages, vec![ChatMessage::new("tool", "42")]);
    }

    #[test]
    fn test_payload_rejects_wrong_shape() {
        assert!(serde_json::from_str::<ChatPayload>(r#"{"messages":"hi"}"#).is_err());
    }
}
