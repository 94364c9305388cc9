//! Book page: detail, favorite toggle, borrow/return, reservation, delete

use validator::Validate;

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult, Notice},
    interaction::{Confirmer, Prompt},
    models::{book::Book, reservation::ReservationRequest},
    services::{
        books::{BooksStore, DEFAULT_BORROW_DAYS},
        events::{EventBus, Route},
    },
    views::report_failure,
};

pub struct BookDetailView {
    book_id: String,
    gateway: Gateway,
    store: BooksStore,
    events: EventBus,
    pub book: Option<Book>,
    pub loading: bool,
    pub is_favorite: bool,
    pub has_borrowed: bool,
}

impl BookDetailView {
    pub fn new(book_id: impl Into<String>, gateway: Gateway, store: BooksStore, events: EventBus) -> Self {
        Self {
            book_id: book_id.into(),
            gateway,
            store,
            events,
            book: None,
            loading: false,
            is_favorite: false,
            has_borrowed: false,
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Load the book; on failure send the user back to the catalog
    pub async fn load(&mut self) -> AppResult<()> {
        self.loading = true;
        let result = self.store.fetch_one(&self.book_id).await;
        self.loading = false;

        match result {
            Ok(book) => {
                self.book = Some(book);
                self.refresh_favorite().await;
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load book", &e);
                self.events.navigate(Route::Books);
                Err(e)
            }
        }
    }

    /// Initial favorite state; a failed check leaves it unset
    pub async fn refresh_favorite(&mut self) {
        if !self.gateway.session().is_authenticated().await {
            return;
        }
        match api::users::is_favorite(&self.gateway, &self.book_id).await {
            Ok(flag) => self.is_favorite = flag,
            Err(e) => tracing::debug!(book_id = %self.book_id, error = %e, "favorite check failed"),
        }
    }

    pub async fn toggle_favorite(&mut self) -> AppResult<()> {
        let result = if self.is_favorite {
            api::users::remove_favorite(&self.gateway, &self.book_id).await
        } else {
            api::users::add_favorite(&self.gateway, &self.book_id).await
        };

        match result {
            Ok(()) => {
                self.is_favorite = !self.is_favorite;
                let message = if self.is_favorite {
                    "Added to favorites"
                } else {
                    "Removed from favorites"
                };
                self.events.notify(Notice::Success(message.to_string()));
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Favorite update failed", &e);
                Err(e)
            }
        }
    }

    pub async fn borrow(&mut self) -> AppResult<()> {
        match self.store.borrow(&self.book_id, DEFAULT_BORROW_DAYS).await {
            Ok(_) => {
                self.has_borrowed = true;
                self.book = self.store.current().await;
                self.events.notify(Notice::Success("Book borrowed".to_string()));
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Borrow failed", &e);
                Err(e)
            }
        }
    }

    pub async fn return_book(&mut self, confirmer: &dyn Confirmer) -> AppResult<()> {
        let prompt = Prompt::new("Confirm return", "Return this book?");
        if !confirmer.confirm(&prompt).await {
            return Err(AppError::Cancelled);
        }

        match self.store.return_book(&self.book_id).await {
            Ok(()) => {
                self.has_borrowed = false;
                self.book = self.store.current().await;
                self.events.notify(Notice::Success("Book returned".to_string()));
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Return failed", &e);
                Err(e)
            }
        }
    }

    pub async fn reserve(&mut self, request: &ReservationRequest) -> AppResult<()> {
        request.validate()?;

        let result = match api::books::reserve(&self.gateway, &self.book_id, request).await {
            Ok(receipt) if receipt.success => Ok(()),
            Ok(receipt) => Err(AppError::Rejected(
                receipt.error.unwrap_or_else(|| "Reservation failed".to_string()),
            )),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(book_id = %self.book_id, date = %request.reserve_date, "book reserved");
                self.events.notify(Notice::Success("Reservation confirmed".to_string()));
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Reservation failed", &e);
                Err(e)
            }
        }
    }

    pub fn edit(&self) {
        self.events.navigate(Route::BookEdit(self.book_id.clone()));
    }

    pub async fn delete(&mut self, confirmer: &dyn Confirmer) -> AppResult<()> {
        let prompt = Prompt::new("Confirm delete", "Delete this book?");
        if !confirmer.confirm(&prompt).await {
            return Err(AppError::Cancelled);
        }

        match self.store.delete(&self.book_id).await {
            Ok(()) => {
                self.book = None;
                self.events.notify(Notice::Success("Book deleted".to_string()));
                self.events.navigate(Route::Books);
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Delete failed", &e);
                Err(e)
            }
        }
    }

    pub fn go_back(&self) {
        self.events.navigate(Route::Back);
    }
}
