//! Borrow records resource store

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult},
    interaction::{Confirmer, Prompt},
    models::borrow::{BorrowRecord, BorrowStatus},
    services::session::{Session, UserScoped},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorrowsState {
    pub records: Vec<BorrowRecord>,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct BorrowsStore {
    gateway: Gateway,
    state: Arc<RwLock<BorrowsState>>,
}

impl BorrowsStore {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(BorrowsState::default())),
        }
    }

    pub async fn snapshot(&self) -> BorrowsState {
        self.state.read().await.clone()
    }

    pub async fn records(&self) -> Vec<BorrowRecord> {
        self.state.read().await.records.clone()
    }

    /// Replace the cache with the current user's records
    pub async fn fetch_mine(&self) -> AppResult<Vec<BorrowRecord>> {
        self.begin().await;
        let result = api::borrows::mine(&self.gateway).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(mut records) => {
                for record in &mut records {
                    record.returning = false;
                }
                tracing::debug!(count = records.len(), "borrow records loaded");
                state.records = records.clone();
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load borrow records");
                state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn return_one(&self, borrow_id: &str) -> AppResult<()> {
        let ids = [borrow_id.to_string()];
        self.set_returning(&ids, true).await;

        let result = match api::borrows::return_by_id(&self.gateway, borrow_id).await {
            Ok(answer) if answer.success => Ok(()),
            Ok(answer) => Err(AppError::Rejected(
                answer.error.unwrap_or_else(|| "Return failed".to_string()),
            )),
            Err(e) => Err(e),
        };

        self.finish(&ids, &result).await;
        result?;

        tracing::info!(%borrow_id, "borrow record returned");
        Ok(())
    }

    /// Return several records at once after the user confirmed.
    /// Returns the count the server reports, or the requested count.
    pub async fn return_batch(&self, borrow_ids: &[String], confirmer: &dyn Confirmer) -> AppResult<u32> {
        if borrow_ids.is_empty() {
            return Err(AppError::Validation("no borrow record selected".to_string()));
        }

        let prompt = Prompt::new("Confirm return", "Return the selected books?");
        if !confirmer.confirm(&prompt).await {
            tracing::debug!(count = borrow_ids.len(), "batch return cancelled");
            return Err(AppError::Cancelled);
        }

        self.set_returning(borrow_ids, true).await;

        let result = match api::borrows::batch_return(&self.gateway, borrow_ids).await {
            Ok(answer) if answer.success => {
                for item in answer.results.iter().filter(|item| !item.success) {
                    tracing::warn!(borrow_id = %item.borrow_id, error = ?item.error, "record not returned by server");
                }
                Ok(answer.returned_count.unwrap_or(borrow_ids.len() as u32))
            }
            Ok(answer) => Err(AppError::Rejected(
                answer.error.unwrap_or_else(|| "Batch return failed".to_string()),
            )),
            Err(e) => Err(e),
        };

        self.finish(borrow_ids, &result).await;
        let count = result?;

        tracing::info!(requested = borrow_ids.len(), returned = count, "batch return completed");
        Ok(count)
    }

    /// Borrowed records first, original order kept within each group
    pub async fn sort_by_status(&self) {
        self.state
            .write()
            .await
            .records
            .sort_by_key(|r| r.status != BorrowStatus::Borrowed);
    }

    /// Newest borrow first
    pub async fn sort_by_date(&self) {
        self.state
            .write()
            .await
            .records
            .sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
    }

    /// Drop the records whenever `session` ends
    pub fn bind_to(&self, session: &Session) {
        let cache: Weak<dyn UserScoped> = Arc::downgrade(&self.state) as Weak<_>;
        session.bind(cache);
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.last_error = None;
    }

    async fn set_returning(&self, ids: &[String], returning: bool) {
        let mut state = self.state.write().await;
        for record in state.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.returning = returning;
        }
    }

    /// Clear the in-flight flags; on success mark the records returned
    async fn finish<T>(&self, ids: &[String], result: &AppResult<T>) {
        let now = Utc::now().timestamp();
        let mut state = self.state.write().await;

        for record in state.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.returning = false;
            if result.is_ok() {
                record.mark_returned(now);
            }
        }

        if let Err(e) = result {
            tracing::warn!(count = ids.len(), error = %e, "return failed");
            state.last_error = Some(e.user_message());
        }
    }
}

#[async_trait]
impl UserScoped for RwLock<BorrowsState> {
    async fn clear_user_data(&self) {
        *self.write().await = BorrowsState::default();
    }
}
