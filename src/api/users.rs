//! Current user, favorites and view history endpoints

use serde_json::Value;

use super::Gateway;
use crate::{
    error::AppResult,
    models::{
        favorite::{FavoriteCheck, FavoriteItem, HistoryItem},
        user::{ProfileUpdate, ProfileUpdateResponse},
        Listing,
    },
};

pub async fn current(gateway: &Gateway) -> AppResult<Value> {
    gateway.get("/user/current").await
}

pub async fn update_profile(gateway: &Gateway, update: &ProfileUpdate) -> AppResult<ProfileUpdateResponse> {
    gateway.put("/user/profile", update).await
}

pub async fn favorites(gateway: &Gateway) -> AppResult<Vec<FavoriteItem>> {
    let listing: Listing<FavoriteItem> = gateway.get("/favorites").await?;
    Ok(listing.into_vec())
}

pub async fn add_favorite(gateway: &Gateway, book_id: &str) -> AppResult<()> {
    let _: Value = gateway.post_empty(&format!("/favorites/{}", book_id)).await?;
    Ok(())
}

pub async fn remove_favorite(gateway: &Gateway, book_id: &str) -> AppResult<()> {
    gateway.delete(&format!("/favorites/{}", book_id)).await?;
    Ok(())
}

pub async fn is_favorite(gateway: &Gateway, book_id: &str) -> AppResult<bool> {
    let check: FavoriteCheck = gateway.get(&format!("/favorites/{}/check", book_id)).await?;
    Ok(check.is_favorite)
}

pub async fn history(gateway: &Gateway) -> AppResult<Vec<HistoryItem>> {
    let listing: Listing<HistoryItem> = gateway.get("/history").await?;
    Ok(listing.into_vec())
}
