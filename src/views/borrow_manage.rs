//! "My borrows" screen: selection, sorting, single and batch return

use crate::{
    error::{AppResult, Notice},
    interaction::Confirmer,
    models::borrow::BorrowRecord,
    services::{borrows::BorrowsStore, events::EventBus},
    views::report_failure,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Status,
    Date,
}

pub struct BorrowManageView {
    store: BorrowsStore,
    events: EventBus,
    pub selected: Vec<String>,
    pub sort: Option<SortOrder>,
}

impl BorrowManageView {
    pub fn new(store: BorrowsStore, events: EventBus) -> Self {
        Self {
            store,
            events,
            selected: Vec::new(),
            sort: None,
        }
    }

    pub async fn records(&self) -> Vec<BorrowRecord> {
        self.store.records().await
    }

    pub async fn load(&mut self) -> AppResult<()> {
        if let Err(e) = self.store.fetch_mine().await {
            report_failure(&self.events, "Failed to load borrow records", &e);
            return Err(e);
        }
        self.selected.clear();
        self.reapply_sort().await;
        Ok(())
    }

    pub fn set_selection(&mut self, ids: Vec<String>) {
        self.selected = ids;
    }

    pub async fn sort_by(&mut self, order: SortOrder) {
        self.sort = Some(order);
        self.reapply_sort().await;
    }

    pub async fn return_one(&mut self, borrow_id: &str) -> AppResult<()> {
        match self.store.return_one(borrow_id).await {
            Ok(()) => {
                self.events.notify(Notice::Success("Book returned".to_string()));
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Return failed", &e);
                Err(e)
            }
        }
    }

    /// Return every selected record; clears the selection on success
    pub async fn return_selected(&mut self, confirmer: &dyn Confirmer) -> AppResult<u32> {
        match self.store.return_batch(&self.selected, confirmer).await {
            Ok(count) => {
                self.events
                    .notify(Notice::Success(format!("Returned {} book(s)", count)));
                self.selected.clear();
                Ok(count)
            }
            Err(e) => {
                report_failure(&self.events, "Batch return failed", &e);
                Err(e)
            }
        }
    }

    async fn reapply_sort(&self) {
        match self.sort {
            Some(SortOrder::Status) => self.store.sort_by_status().await,
            Some(SortOrder::Date) => self.store.sort_by_date().await,
            None => {}
        }
    }
}
