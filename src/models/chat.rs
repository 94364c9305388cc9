//! AI assistant chat messages

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// One chat line; `timestamp` is in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Assistant answer; `timestamp` is in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub timestamp: i64,
}
