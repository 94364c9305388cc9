//! Create/edit book form

use validator::Validate;

use crate::{
    error::{AppResult, Notice},
    models::book::{Book, BookDraft},
    services::{
        books::BooksStore,
        events::{EventBus, Route},
    },
    views::report_failure,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

pub struct BookFormView {
    store: BooksStore,
    events: EventBus,
    pub mode: FormMode,
    pub draft: BookDraft,
    pub loading: bool,
    pub submitting: bool,
}

impl BookFormView {
    pub fn new(mode: FormMode, store: BooksStore, events: EventBus) -> Self {
        Self {
            store,
            events,
            mode,
            draft: BookDraft::default(),
            loading: false,
            submitting: false,
        }
    }

    /// Fill the form from the stored book in edit mode
    pub async fn load(&mut self) -> AppResult<()> {
        let FormMode::Edit(id) = &self.mode else {
            return Ok(());
        };

        self.loading = true;
        let result = self.store.fetch_one(id).await;
        self.loading = false;

        match result {
            Ok(book) => {
                self.draft = BookDraft::from(&book);
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load book", &e);
                Err(e)
            }
        }
    }

    /// Validate, then create or update; returns the created book in create mode
    pub async fn submit(&mut self) -> AppResult<Option<Book>> {
        if let Err(e) = self.draft.validate() {
            self.events
                .notify(Notice::Warning("Please fill in the required fields".to_string()));
            return Err(e.into());
        }

        self.submitting = true;
        let result = match &self.mode {
            FormMode::Create => self.store.create(&self.draft).await.map(Some),
            FormMode::Edit(id) => self.store.update_from_draft(id, &self.draft).await.map(|_| None),
        };
        self.submitting = false;

        let (done, failed) = match self.mode {
            FormMode::Create => ("Book added", "Add failed"),
            FormMode::Edit(_) => ("Book updated", "Update failed"),
        };

        match result {
            Ok(created) => {
                self.events.notify(Notice::Success(done.to_string()));
                self.events.navigate(Route::Books);
                Ok(created)
            }
            Err(e) => {
                report_failure(&self.events, failed, &e);
                Err(e)
            }
        }
    }
}
