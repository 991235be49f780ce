use serde::{Deserialize, Serialize};

/// Body of a chat request sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The user's message.
    pub text: String,
}

impl ChatRequest {
    /// Create a new `ChatRequest`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn chat_request_serialization() {
        let request = ChatRequest::new("What is my market size?");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"text": "What is my market size?"})
        );
    }
}
