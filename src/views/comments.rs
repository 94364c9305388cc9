//! Comment section of the book page

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult, Notice},
    models::comment::{assemble_threads, find_thread_mut, total_count, CommentThread, NewComment},
    services::events::EventBus,
    views::report_failure,
};

/// Replies revealed per "show more"
pub const REPLIES_STEP: usize = 2;

pub struct CommentsView {
    book_id: String,
    gateway: Gateway,
    events: EventBus,
    pub threads: Vec<CommentThread>,
    pub submitting: bool,
}

impl CommentsView {
    pub fn new(book_id: impl Into<String>, gateway: Gateway, events: EventBus) -> Self {
        Self {
            book_id: book_id.into(),
            gateway,
            events,
            threads: Vec::new(),
            submitting: false,
        }
    }

    /// Every comment on the page, nested replies included
    pub fn total_count(&self) -> usize {
        total_count(&self.threads)
    }

    /// Fetch and rebuild the tree; display state starts over
    pub async fn fetch(&mut self) -> AppResult<()> {
        match api::comments::list(&self.gateway, &self.book_id).await {
            Ok(comments) => {
                self.threads = assemble_threads(comments);
                tracing::debug!(book_id = %self.book_id, total = self.total_count(), "comments loaded");
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load comments", &e);
                Err(e)
            }
        }
    }

    /// Post a comment or a reply, then refetch
    pub async fn submit(&mut self, content: &str, parent_id: Option<String>) -> AppResult<()> {
        let content = content.trim();
        if content.is_empty() {
            self.events
                .notify(Notice::Warning("Comment cannot be empty".to_string()));
            return Err(AppError::Validation("comment content is required".to_string()));
        }

        let comment = NewComment {
            content: content.to_string(),
            parent_id,
        };

        self.submitting = true;
        let result = api::comments::create(&self.gateway, &self.book_id, &comment).await;
        self.submitting = false;

        if let Err(e) = result {
            report_failure(&self.events, "Failed to post comment", &e);
            return Err(e);
        }

        self.events.notify(Notice::Success("Comment posted".to_string()));
        self.fetch().await
    }

    pub async fn like(&mut self, comment_id: &str) -> AppResult<()> {
        if let Err(e) = api::comments::like(&self.gateway, comment_id).await {
            report_failure(&self.events, "Like failed", &e);
            return Err(e);
        }
        self.fetch().await
    }

    pub fn toggle_replies(&mut self, comment_id: &str) {
        if let Some(thread) = find_thread_mut(&mut self.threads, comment_id) {
            thread.toggle_replies();
        }
    }

    pub fn show_more_replies(&mut self, comment_id: &str) {
        if let Some(thread) = find_thread_mut(&mut self.threads, comment_id) {
            thread.show_more_replies(REPLIES_STEP);
        }
    }
}
