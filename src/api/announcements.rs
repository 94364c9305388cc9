//! Announcement endpoint

use super::Gateway;
use crate::{
    error::AppResult,
    models::{Announcement, Listing},
};

pub async fn list(gateway: &Gateway) -> AppResult<Vec<Announcement>> {
    let listing: Listing<Announcement> = gateway.get("/announcements").await?;
    Ok(listing.into_vec())
}
