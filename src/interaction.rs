//! User confirmation prompts
//!
//! Destructive actions (batch return, delete) ask the front end before any
//! request is issued. A declined prompt surfaces as `AppError::Cancelled`.

use async_trait::async_trait;

/// Prompt shown before a destructive action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolves to true when the user accepts
    async fn confirm(&self, prompt: &Prompt) -> bool;
}

/// Confirmer with a fixed answer, for non-interactive front ends
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        tracing::debug!(title = %prompt.title, answer = self.0, "auto-answering confirmation");
        self.0
    }
}
