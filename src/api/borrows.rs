//! Borrow record endpoints

use super::Gateway;
use crate::{
    error::AppResult,
    models::{
        borrow::{ActionResult, BatchReturnRequest, BatchReturnResponse, BorrowRecord},
        Listing,
    },
};

pub async fn mine(gateway: &Gateway) -> AppResult<Vec<BorrowRecord>> {
    let listing: Listing<BorrowRecord> = gateway.get("/user/borrows").await?;
    Ok(listing.into_vec())
}

pub async fn return_by_id(gateway: &Gateway, borrow_id: &str) -> AppResult<ActionResult> {
    gateway.post_empty(&format!("/return/{}", borrow_id)).await
}

pub async fn batch_return(gateway: &Gateway, borrow_ids: &[String]) -> AppResult<BatchReturnResponse> {
    let request = BatchReturnRequest {
        borrow_ids: borrow_ids.to_vec(),
    };
    gateway.post("/batch-return", &request).await
}
