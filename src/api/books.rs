//! Catalog endpoints

use serde_json::Value;

use super::{decode_as, Gateway};
use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDraft, BookPage, BookPatch, BookQuery, CreatedBook},
        borrow::{ActionResult, BorrowReceipt, BorrowRequest},
        reservation::{ReservationReceipt, ReservationRequest},
    },
};

pub async fn list(gateway: &Gateway, query: &BookQuery) -> AppResult<BookPage> {
    let mut params = vec![("page", query.page.to_string()), ("size", query.size.to_string())];
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        params.push(("category", category.to_string()));
    }
    gateway.get_with_query("/books", &params).await
}

pub async fn get(gateway: &Gateway, id: &str) -> AppResult<Book> {
    gateway.get(&format!("/books/{}", id)).await
}

/// Create a book. The server may answer with the full record or only with
/// the new id; in the latter case the record is rebuilt from the draft.
pub async fn create(gateway: &Gateway, draft: &BookDraft) -> AppResult<Book> {
    let data: Value = gateway.post("/books", draft).await?;
    if let Ok(book) = serde_json::from_value::<Book>(data.clone()) {
        return Ok(book);
    }
    let created: CreatedBook = decode_as(data, "/books")?;
    Ok(draft.clone().into_book(created.book_id))
}

pub async fn update(gateway: &Gateway, id: &str, patch: &BookPatch) -> AppResult<Value> {
    gateway.put(&format!("/books/{}", id), patch).await
}

/// Delete a book; returns the HTTP status that confirmed it
pub async fn delete(gateway: &Gateway, id: &str) -> AppResult<u16> {
    let response = gateway.delete(&format!("/books/{}", id)).await?;
    Ok(response.status)
}

pub async fn borrow(gateway: &Gateway, id: &str, days: u32) -> AppResult<BorrowReceipt> {
    gateway.post(&format!("/books/{}/borrow", id), &BorrowRequest { days }).await
}

pub async fn return_book(gateway: &Gateway, id: &str) -> AppResult<ActionResult> {
    gateway.post_empty(&format!("/books/{}/return", id)).await
}

pub async fn reserve(gateway: &Gateway, id: &str, request: &ReservationRequest) -> AppResult<ReservationReceipt> {
    gateway.post(&format!("/books/{}/reserve", id), request).await
}
