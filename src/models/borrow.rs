//! Borrow (loan) records and related request/response types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

/// Borrow record of the current user. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    #[serde(rename = "borrow_id", alias = "id")]
    pub id: String,
    pub book_id: String,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_author: String,
    #[serde(default)]
    pub book_cover: String,
    #[serde(default, alias = "user_id")]
    pub borrower: String,
    pub borrow_date: i64,
    #[serde(default)]
    pub due_date: i64,
    /// The server sends 0 while the book is still out
    #[serde(default, deserialize_with = "zero_as_none")]
    pub return_date: Option<i64>,
    pub status: BorrowStatus,
    /// UI-only: a return request for this record is in flight
    #[serde(skip)]
    pub returning: bool,
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.filter(|at| *at > 0))
}

impl BorrowRecord {
    /// borrowed -> returned, once. Returns false when already returned.
    pub fn mark_returned(&mut self, at: i64) -> bool {
        if self.status == BorrowStatus::Returned {
            return false;
        }
        self.status = BorrowStatus::Returned;
        self.return_date = Some(at);
        true
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.due_date, 0).single()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BorrowStatus::Borrowed
            && self.due_date > 0
            && self.due_at().map(|due| due < now).unwrap_or(false)
    }
}

/// Borrow request body
#[derive(Debug, Serialize)]
pub struct BorrowRequest {
    pub days: u32,
}

/// Answer to a borrow request
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowReceipt {
    pub success: bool,
    #[serde(default)]
    pub borrow_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Generic `{success, message?, error?}` answer
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReturnRequest {
    pub borrow_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchReturnItem {
    pub borrow_id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchReturnResponse {
    pub success: bool,
    #[serde(default)]
    pub returned_count: Option<u32>,
    #[serde(default)]
    pub results: Vec<BatchReturnItem>,
    #[serde(default)]
    pub error: Option<String>,
}
