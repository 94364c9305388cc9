//! AI assistant chat widget: history, sending, window state

use chrono::Utc;
use std::sync::Arc;

use crate::{
    api::{self, Gateway},
    config::ChatConfig,
    error::{AppResult, Notice},
    models::chat::{ChatMessage, ChatRole},
    services::storage::Storage,
    views::geometry::WidgetGeometry,
};

const HISTORY_KEY: &str = "ai_chat_history";
const APOLOGY: &str = "Sorry, I cannot handle your request right now. Please try again later.";

/// Storage key of a user's chat history
pub fn history_key(user_id: Option<&str>) -> String {
    match user_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("{}_{}", HISTORY_KEY, id),
        None => HISTORY_KEY.to_string(),
    }
}

pub struct ChatView {
    gateway: Gateway,
    storage: Arc<dyn Storage>,
    config: ChatConfig,
    key: String,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub loading: bool,
    pub minimized: bool,
    pub has_new_message: bool,
    pub geometry: WidgetGeometry,
}

impl ChatView {
    pub fn new(gateway: Gateway, storage: Arc<dyn Storage>, config: ChatConfig) -> Self {
        Self {
            gateway,
            storage,
            config,
            key: history_key(None),
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            minimized: true,
            has_new_message: false,
            geometry: WidgetGeometry::default(),
        }
    }

    pub fn quick_questions(&self) -> &[String] {
        &self.config.quick_questions
    }

    /// Load the current user's history, or start it with the welcome message
    pub async fn load(&mut self) {
        let user_id = self.gateway.session().user_id().await;
        self.key = history_key(user_id.as_deref());

        match self.storage.get_json::<Vec<ChatMessage>>(&self.key) {
            Some(messages) => self.messages = messages,
            None => {
                self.messages = vec![ChatMessage::assistant(
                    self.config.welcome_message.clone(),
                    Utc::now().timestamp_millis(),
                )];
                self.save();
            }
        }
    }

    /// Send the current input. Blank input and sends while a reply is
    /// pending are ignored.
    pub async fn send(&mut self) -> AppResult<()> {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.loading {
            return Ok(());
        }
        self.input.clear();

        self.messages
            .push(ChatMessage::user(text.clone(), Utc::now().timestamp_millis()));
        self.save();

        self.loading = true;
        let result = api::ai::chat(&self.gateway, &text).await;
        self.loading = false;

        let reply = match &result {
            Ok(reply) => ChatMessage::assistant(reply.response.clone(), reply.timestamp * 1000),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.gateway
                    .events()
                    .notify(Notice::Error("Failed to send message, check your connection".to_string()));
                ChatMessage::assistant(APOLOGY, Utc::now().timestamp_millis())
            }
        };
        self.push_assistant(reply);

        result.map(|_| ())
    }

    pub async fn ask(&mut self, question: &str) -> AppResult<()> {
        self.input = question.to_string();
        self.send().await
    }

    pub fn toggle_minimize(&mut self) {
        self.minimized = !self.minimized;
        if !self.minimized {
            self.has_new_message = false;
        }
    }

    pub fn close(&mut self) {
        self.minimized = true;
    }

    fn push_assistant(&mut self, message: ChatMessage) {
        if self.minimized && message.role == ChatRole::Assistant {
            self.has_new_message = true;
        }
        self.messages.push(message);
        self.save();
    }

    fn save(&self) {
        if let Err(e) = self.storage.set_json(&self.key, &self.messages) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist chat history");
        }
    }
}
