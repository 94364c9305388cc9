//! AI assistant endpoint

use super::Gateway;
use crate::{
    error::AppResult,
    models::chat::{ChatReply, ChatRequest},
};

pub async fn chat(gateway: &Gateway, message: &str) -> AppResult<ChatReply> {
    let request = ChatRequest {
        message: message.to_string(),
    };
    gateway.post("/ai/chat", &request).await
}
