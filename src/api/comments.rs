//! Book comment endpoints

use serde_json::Value;

use super::Gateway;
use crate::{
    error::AppResult,
    models::{
        comment::{Comment, NewComment},
        Listing,
    },
};

pub async fn list(gateway: &Gateway, book_id: &str) -> AppResult<Vec<Comment>> {
    let listing: Listing<Comment> = gateway.get(&format!("/books/{}/comments", book_id)).await?;
    Ok(listing.into_vec())
}

pub async fn create(gateway: &Gateway, book_id: &str, comment: &NewComment) -> AppResult<Value> {
    gateway.post(&format!("/books/{}/comments", book_id), comment).await
}

pub async fn like(gateway: &Gateway, comment_id: &str) -> AppResult<Value> {
    gateway.post_empty(&format!("/comments/{}/like", comment_id)).await
}
