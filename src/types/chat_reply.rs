use serde::{Deserialize, Serialize};

/// Text used when the backend answers without a `response` field.
pub const EMPTY_REPLY: &str = "No response from AI";

/// Body of a chat reply returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChatReply {
    /// The assistant's answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ChatReply {
    /// Create a new `ChatReply`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    /// Returns the reply text, or [`EMPTY_REPLY`] when the backend sent none.
    pub fn into_text(self) -> String {
        match self.response {
            Some(text) if !text.is_empty() => text,
            _ => EMPTY_REPLY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_reply_deserialization() {
        let reply: ChatReply = serde_json::from_value(json!({"response": "Hello!"})).unwrap();
        assert_eq!(reply.into_text(), "Hello!");
    }

    #[test]
    fn missing_response_uses_placeholder() {
        let reply: ChatReply = serde_json::from_value(json!({"other": 1})).unwrap();
        assert_eq!(reply.into_text(), EMPTY_REPLY);
        assert_eq!(ChatReply::new("").into_text(), EMPTY_REPLY);
    }
}
