//! Book model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Book availability as shown in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Maintenance,
}

impl BookStatus {
    /// Status implied by a stock level. Maintenance is sticky: only an
    /// explicit status change takes a book out of it.
    pub fn from_stock(stock: u32, current: BookStatus) -> Self {
        match (current, stock) {
            (BookStatus::Maintenance, _) => BookStatus::Maintenance,
            (_, 0) => BookStatus::Borrowed,
            _ => BookStatus::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Maintenance => "Under maintenance",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "maintenance" => Ok(BookStatus::Maintenance),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// Book as returned by the catalog endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "book_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default)]
    pub cover: String,
}

impl Book {
    /// Shallow merge: fields present in the patch overwrite, the rest stay.
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.author {
            self.author = v.clone();
        }
        if let Some(v) = &patch.publisher {
            self.publisher = v.clone();
        }
        if let Some(v) = &patch.isbn {
            self.isbn = v.clone();
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = &patch.category {
            self.category = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.summary {
            self.summary = v.clone();
        }
        if let Some(v) = &patch.cover {
            self.cover = v.clone();
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
            if patch.status.is_none() {
                self.status = BookStatus::from_stock(stock, self.status);
            }
        }
    }

    /// Local effect of a confirmed borrow. The cover is never touched.
    pub fn record_borrow(&mut self) {
        self.stock = self.stock.saturating_sub(1);
        self.status = BookStatus::from_stock(self.stock, self.status);
    }

    /// Local effect of a confirmed return: a returned copy is always available.
    pub fn record_return(&mut self) {
        self.stock = self.stock.saturating_add(1);
        self.status = BookStatus::Available;
    }

    pub fn is_borrowable(&self) -> bool {
        self.stock > 0 && self.status == BookStatus::Available
    }
}

/// Partial book update; `None` fields are left untouched on merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Full book payload used by the create/edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BookDraft {
    pub cover: String,
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: f64,
    pub stock: u32,
    pub category: String,
    pub description: String,
    pub summary: String,
    pub status: BookStatus,
}

impl Default for BookDraft {
    fn default() -> Self {
        Self {
            cover: String::new(),
            title: String::new(),
            author: String::new(),
            publisher: String::new(),
            isbn: String::new(),
            price: 0.0,
            stock: 1,
            category: String::new(),
            description: String::new(),
            summary: String::new(),
            status: BookStatus::Available,
        }
    }
}

impl BookDraft {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            isbn: self.isbn,
            price: self.price,
            stock: self.stock,
            category: self.category,
            description: self.description,
            summary: self.summary,
            status: self.status,
            cover: self.cover,
        }
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            cover: book.cover.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            isbn: book.isbn.clone(),
            price: book.price,
            // Forms never start at zero copies
            stock: book.stock.max(1),
            category: book.category.clone(),
            description: book.description.clone(),
            summary: book.summary.clone(),
            status: book.status,
        }
    }
}

impl From<BookDraft> for BookPatch {
    fn from(draft: BookDraft) -> Self {
        Self {
            title: Some(draft.title),
            author: Some(draft.author),
            publisher: Some(draft.publisher),
            isbn: Some(draft.isbn),
            price: Some(draft.price),
            stock: Some(draft.stock),
            category: Some(draft.category),
            description: Some(draft.description),
            summary: Some(draft.summary),
            status: Some(draft.status),
            cover: Some(draft.cover),
        }
    }
}

/// Catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub page: u32,
    pub size: u32,
    pub category: Option<String>,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            category: None,
        }
    }
}

/// One page of the catalog; `total` counts every matching book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: u64,
}

/// Answer to a create request when the server only echoes the new id
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedBook {
    pub book_id: String,
    #[serde(default)]
    pub message: Option<String>,
}
