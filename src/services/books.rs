//! Books resource store
//!
//! Caches the current catalog page and the detail slot. Mutations patch the
//! cache only after the server confirmed them; the cache is never
//! authoritative and the next fetch replaces it.
//!
//! Every operation goes through one `loading` flag and one `last_error`
//! slot. Overlapping calls race on both, and two overlapping borrows of the
//! same book each apply their own decrement: no call is serialized here.

use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookPage, BookPatch, BookQuery},
    services::{
        events::{Event, EventBus},
        session::{Session, UserScoped},
    },
};

/// Default loan length in days
pub const DEFAULT_BORROW_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooksState {
    pub books: Vec<Book>,
    pub current: Option<Book>,
    pub total: u64,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl BooksState {
    /// Apply `patch` to the cached entry and to the detail slot when they match `id`
    fn patch_each(&mut self, id: &str, mut patch: impl FnMut(&mut Book)) {
        if let Some(book) = self.books.iter_mut().find(|b| b.id == id) {
            patch(book);
        }
        if let Some(book) = self.current.as_mut().filter(|b| b.id == id) {
            patch(book);
        }
    }
}

#[derive(Clone)]
pub struct BooksStore {
    gateway: Gateway,
    events: EventBus,
    state: Arc<RwLock<BooksState>>,
}

impl BooksStore {
    pub fn new(gateway: Gateway, events: EventBus) -> Self {
        Self {
            gateway,
            events,
            state: Arc::new(RwLock::new(BooksState::default())),
        }
    }

    pub async fn snapshot(&self) -> BooksState {
        self.state.read().await.clone()
    }

    pub async fn books(&self) -> Vec<Book> {
        self.state.read().await.books.clone()
    }

    pub async fn current(&self) -> Option<Book> {
        self.state.read().await.current.clone()
    }

    pub async fn total(&self) -> u64 {
        self.state.read().await.total
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Replace the cache with one page of the catalog
    pub async fn fetch_list(&self, query: &BookQuery) -> AppResult<BookPage> {
        let page = self.track("fetch_list", api::books::list(&self.gateway, query)).await?;

        let mut state = self.state.write().await;
        state.books = page.items.clone();
        state.total = page.total;
        tracing::debug!(page = query.page, count = page.items.len(), total = page.total, "book list loaded");

        Ok(page)
    }

    pub async fn fetch_one(&self, id: &str) -> AppResult<Book> {
        let book = self.track("fetch_one", api::books::get(&self.gateway, id)).await?;
        self.state.write().await.current = Some(book.clone());
        Ok(book)
    }

    pub async fn create(&self, draft: &BookDraft) -> AppResult<Book> {
        let book = self
            .track("create", async {
                draft.validate()?;
                api::books::create(&self.gateway, draft).await
            })
            .await?;

        {
            let mut state = self.state.write().await;
            state.books.push(book.clone());
            state.total += 1;
        }

        tracing::info!(book_id = %book.id, title = %book.title, "book created");
        self.events.emit(Event::BookAdded {
            book_id: book.id.clone(),
        });

        Ok(book)
    }

    /// Send a partial update and shallow-merge it into the cache
    pub async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<()> {
        self.track("update", api::books::update(&self.gateway, id, patch)).await?;

        self.state.write().await.patch_each(id, |book| book.apply(patch));
        tracing::info!(book_id = %id, "book updated");
        Ok(())
    }

    pub async fn update_from_draft(&self, id: &str, draft: &BookDraft) -> AppResult<()> {
        draft.validate()?;
        self.update(id, &BookPatch::from(draft.clone())).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let status = self.track("delete", api::books::delete(&self.gateway, id)).await?;
        if !(200..300).contains(&status) {
            return Err(self.record(AppError::Http {
                status,
                message: format!("Delete not confirmed: {}", status),
            })
            .await);
        }

        let mut state = self.state.write().await;
        let before = state.books.len();
        state.books.retain(|b| b.id != id);
        if state.books.len() < before {
            state.total = state.total.saturating_sub(1);
        }
        if state.current.as_ref().is_some_and(|b| b.id == id) {
            state.current = None;
        }

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    /// Borrow a copy for `days` days; returns the new borrow id when the server sends one
    pub async fn borrow(&self, id: &str, days: u32) -> AppResult<Option<String>> {
        let receipt = self.track("borrow", api::books::borrow(&self.gateway, id, days)).await?;
        if !receipt.success {
            let reason = receipt.error.unwrap_or_else(|| "Borrow failed".to_string());
            return Err(self.record(AppError::Rejected(reason)).await);
        }

        self.state.write().await.patch_each(id, Book::record_borrow);
        tracing::info!(book_id = %id, days, borrow_id = ?receipt.borrow_id, "book borrowed");
        Ok(receipt.borrow_id)
    }

    pub async fn return_book(&self, id: &str) -> AppResult<()> {
        let result = self.track("return_book", api::books::return_book(&self.gateway, id)).await?;
        if !result.success {
            let reason = result.error.unwrap_or_else(|| "Return failed".to_string());
            return Err(self.record(AppError::Rejected(reason)).await);
        }

        self.state.write().await.patch_each(id, Book::record_return);
        tracing::info!(book_id = %id, "book returned");
        Ok(())
    }

    /// Drop the cache whenever `session` ends; the next screen fetches again
    pub fn bind_to(&self, session: &Session) {
        let cache: Weak<dyn UserScoped> = Arc::downgrade(&self.state) as Weak<_>;
        session.bind(cache);
    }

    async fn track<T>(&self, action: &str, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }

        let result = call.await;
        self.state.write().await.loading = false;

        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(action, error = %e, "books store operation failed");
                Err(self.record(e).await)
            }
        }
    }

    async fn record(&self, error: AppError) -> AppError {
        self.state.write().await.last_error = Some(error.user_message());
        error
    }
}

#[async_trait]
impl UserScoped for RwLock<BooksState> {
    async fn clear_user_data(&self) {
        *self.write().await = BooksState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{Method, ScriptedTransport};
    use crate::models::book::BookStatus;
    use crate::services::{
        events::drain,
        session::Session,
        storage::{MemoryStorage, Storage},
    };
    use serde_json::json;

    fn setup() -> (Arc<ScriptedTransport>, BooksStore, EventBus) {
        let transport = Arc::new(ScriptedTransport::new());
        let events = EventBus::default();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = Session::restore(storage, events.clone());
        let gateway = Gateway::new(transport.clone(), "http://api.test", session, events.clone());
        (transport, BooksStore::new(gateway, events.clone()), events)
    }

    fn book(id: &str, stock: u32) -> serde_json::Value {
        json!({
            "book_id": id,
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "978-0441013593",
            "stock": stock,
            "status": if stock == 0 { "borrowed" } else { "available" },
            "cover": "covers/dune.jpg"
        })
    }

    async fn seeded(stock: u32) -> (Arc<ScriptedTransport>, BooksStore, EventBus) {
        let (transport, store, events) = setup();
        transport.reply(Method::Get, "/books?page=1&size=10", 200, json!({"items": [book("b1", stock)], "total": 1}));
        transport.reply(Method::Get, "/books/b1", 200, book("b1", stock));
        store.fetch_list(&BookQuery::default()).await.unwrap();
        store.fetch_one("b1").await.unwrap();
        (transport, store, events)
    }

    #[tokio::test]
    async fn test_fetch_list_replaces_cache() {
        let (transport, store, _) = setup();
        transport.reply(
            Method::Get,
            "/books?page=2&size=5&category=science",
            200,
            json!({"items": [book("b1", 1), book("b2", 2)], "total": 17}),
        );

        let query = BookQuery {
            page: 2,
            size: 5,
            category: Some("science".into()),
        };
        store.fetch_list(&query).await.unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.books.len(), 2);
        assert_eq!(state.total, 17);
        assert!(!state.loading);
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn test_missing_fields_record_shape_error() {
        let (transport, store, _) = setup();
        transport.reply(Method::Get, "/books?page=1&size=10", 200, json!({"books": []}));

        let err = store.fetch_list(&BookQuery::default()).await.unwrap_err();

        assert!(matches!(err, AppError::ResponseShape(_)));
        assert!(store.last_error().await.is_some());
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_borrow_patches_cache_and_detail() {
        let (transport, store, _) = seeded(3).await;
        transport.reply(Method::Post, "/books/b1/borrow", 200, json!({"success": true, "borrow_id": "r1"}));

        let borrow_id = store.borrow("b1", DEFAULT_BORROW_DAYS).await.unwrap();

        assert_eq!(borrow_id.as_deref(), Some("r1"));
        let state = store.snapshot().await;
        for b in [&state.books[0], state.current.as_ref().unwrap()] {
            assert_eq!(b.stock, 2);
            assert_eq!(b.status, BookStatus::Available);
            assert_eq!(b.cover, "covers/dune.jpg");
        }
        let sent = transport.requests_to(Method::Post, "/books/b1/borrow");
        assert_eq!(sent[0].body_json(), Some(json!({"days": 30})));
    }

    #[tokio::test]
    async fn test_borrow_last_copy_marks_borrowed() {
        let (transport, store, _) = seeded(1).await;
        transport.reply(Method::Post, "/books/b1/borrow", 200, json!({"success": true}));

        store.borrow("b1", 14).await.unwrap();

        let current = store.current().await.unwrap();
        assert_eq!(current.stock, 0);
        assert_eq!(current.status, BookStatus::Borrowed);
    }

    #[tokio::test]
    async fn test_rejected_borrow_leaves_cache() {
        let (transport, store, _) = seeded(1).await;
        transport.reply(
            Method::Post,
            "/books/b1/borrow",
            200,
            json!({"success": false, "error": "limit reached"}),
        );

        let err = store.borrow("b1", 14).await.unwrap_err();

        assert!(matches!(err, AppError::Rejected(_)));
        assert_eq!(store.last_error().await.as_deref(), Some("limit reached"));
        assert_eq!(store.books().await[0].stock, 1);
    }

    #[tokio::test]
    async fn test_return_makes_available() {
        let (transport, store, _) = seeded(0).await;
        transport.reply(Method::Post, "/books/b1/return", 200, json!({"success": true}));

        store.return_book("b1").await.unwrap();

        let b = &store.books().await[0];
        assert_eq!(b.stock, 1);
        assert_eq!(b.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_update_is_shallow_merge() {
        let (transport, store, _) = seeded(2).await;
        transport.reply(Method::Put, "/books/b1", 200, json!({"message": "updated"}));

        let patch = BookPatch {
            title: Some("Dune Messiah".into()),
            ..Default::default()
        };
        store.update("b1", &patch).await.unwrap();

        let state = store.snapshot().await;
        for b in [&state.books[0], state.current.as_ref().unwrap()] {
            assert_eq!(b.title, "Dune Messiah");
            assert_eq!(b.isbn, "978-0441013593");
            assert_eq!(b.author, "Frank Herbert");
        }
    }

    #[tokio::test]
    async fn test_create_appends_and_broadcasts() {
        let (transport, store, events) = seeded(1).await;
        let mut rx = events.subscribe();
        transport.reply(Method::Post, "/books", 201, json!({"book_id": "b9", "message": "created"}));

        let draft = BookDraft {
            title: "Neuromancer".into(),
            author: "William Gibson".into(),
            ..Default::default()
        };
        let created = store.create(&draft).await.unwrap();

        assert_eq!(created.id, "b9");
        assert_eq!(created.stock, 1);
        assert_eq!(store.total().await, 2);
        assert_eq!(store.books().await.len(), 2);
        assert_eq!(drain(&mut rx), vec![Event::BookAdded { book_id: "b9".into() }]);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_server() {
        let (transport, store, _) = setup();
        let err = store.create(&BookDraft::default()).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_and_decrements() {
        let (transport, store, _) = seeded(1).await;
        transport.reply(Method::Delete, "/books/b1", 204, serde_json::Value::Null);

        store.delete("b1").await.unwrap();

        let state = store.snapshot().await;
        assert!(state.books.is_empty());
        assert_eq!(state.total, 0);
        assert_eq!(state.current, None);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_are_not_serialized() {
        let (transport, store, _) = seeded(1).await;
        transport.reply(Method::Post, "/books/b1/borrow", 200, json!({"success": true}));

        let (a, b) = tokio::join!(store.borrow("b1", 7), store.borrow("b1", 7));
        assert!(a.is_ok() && b.is_ok());

        // Both confirmations are applied. The second decrement saturates at
        // zero, so the cache cannot tell that two copies left.
        let current = store.current().await.unwrap();
        assert_eq!(current.stock, 0);
        assert_eq!(current.status, BookStatus::Borrowed);
        assert_eq!(transport.requests_to(Method::Post, "/books/b1/borrow").len(), 2);
    }
}
