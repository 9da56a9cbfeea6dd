//! The three-part prompt sent to the completion endpoint for one hunk.

use serde::Serialize;

/// Prompt text for a single hunk review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Review policy rules.
    pub system: String,
    /// Required reply shape.
    pub output_format: String,
    /// File, PR context and the numbered hunk.
    pub user: String,
}

/// A chat message in the completion request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl Prompt {
    /// The prompt as chat messages, in the order they are sent.
    pub fn messages(&self) -> Vec<ChatMessage<'_>> {
        vec![
            ChatMessage {
                role: "system",
                content: &self.system,
            },
            ChatMessage {
                role: "system",
                content: &self.output_format,
            },
            ChatMessage {
                role: "user",
                content: &self.user,
            },
        ]
    }
}
