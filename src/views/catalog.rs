//! Catalog screen: category filter, text search and pagination

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery},
    services::{books::BooksStore, events::EventBus},
    views::report_failure,
};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Catalog categories: (value sent to the server, display label)
pub const CATEGORIES: [(&str, &str); 8] = [
    ("computer", "Computer science"),
    ("literature", "Literature"),
    ("economy", "Economy"),
    ("history", "History"),
    ("science", "Science"),
    ("art", "Art"),
    ("management", "Management"),
    ("education", "Education"),
];

/// Display label of a category; unknown values are shown as-is
pub fn category_label(value: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

pub struct CatalogView {
    store: BooksStore,
    events: EventBus,
    pub search: String,
    pub category: String,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub loading: bool,
    books: Vec<Book>,
    filtered: Vec<Book>,
}

impl CatalogView {
    pub fn new(store: BooksStore, events: EventBus) -> Self {
        Self {
            store,
            events,
            search: String::new(),
            category: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            loading: false,
            books: Vec::new(),
            filtered: Vec::new(),
        }
    }

    /// Books shown after search and filter
    pub fn visible(&self) -> &[Book] {
        &self.filtered
    }

    /// Fetch the current page and re-apply search and filter
    pub async fn load(&mut self) -> AppResult<()> {
        let query = BookQuery {
            page: self.page,
            size: self.page_size,
            category: Some(self.category.clone()).filter(|c| !c.is_empty()),
        };

        self.loading = true;
        let result = self.store.fetch_list(&query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.total = page.total;
                self.sync().await;
                Ok(())
            }
            Err(e) => {
                report_failure(&self.events, "Failed to load books", &e);
                Err(e)
            }
        }
    }

    /// Pick up the store's current list (after a create, borrow, ...)
    pub async fn sync(&mut self) {
        self.books = self.store.books().await;
        self.reapply();
    }

    pub async fn change_page(&mut self, page: u32) -> AppResult<()> {
        self.page = page.max(1);
        self.load().await
    }

    pub async fn change_page_size(&mut self, size: u32) -> AppResult<()> {
        self.page_size = size.max(1);
        self.page = 1;
        self.load().await
    }

    /// Case-insensitive match on title, author or publisher
    pub fn apply_search(&mut self, query: &str) {
        self.search = query.to_string();
        let needle = query.to_lowercase();
        if needle.is_empty() {
            self.filtered = self.books.clone();
            return;
        }

        self.filtered = self
            .books
            .iter()
            .filter(|b| {
                [&b.title, &b.author, &b.publisher]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
    }

    /// Exact category match on the loaded page
    pub fn apply_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.filtered = if category.is_empty() {
            self.books.clone()
        } else {
            self.books.iter().filter(|b| b.category == category).cloned().collect()
        };
    }

    fn reapply(&mut self) {
        self.filtered = self.books.clone();
        if !self.search.is_empty() {
            let query = self.search.clone();
            self.apply_search(&query);
        } else if !self.category.is_empty() {
            let category = self.category.clone();
            self.apply_category(&category);
        }
    }
}
