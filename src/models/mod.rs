//! Data models for FluxLib

pub mod announcement;
pub mod book;
pub mod borrow;
pub mod chat;
pub mod comment;
pub mod favorite;
pub mod reservation;
pub mod upload;
pub mod user;

use serde::Deserialize;

// Re-export commonly used types
pub use announcement::Announcement;
pub use book::{Book, BookDraft, BookPage, BookPatch, BookQuery, BookStatus};
pub use borrow::{BorrowRecord, BorrowStatus};
pub use chat::{ChatMessage, ChatRole};
pub use comment::{Comment, CommentThread};
pub use favorite::{FavoriteItem, HistoryItem};
pub use user::{Credentials, Profile};

/// List endpoints answer either with a bare array or with `{items: [...]}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { items } => items,
        }
    }
}
