//! Favorites and view history entries shown on the profile page

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    #[serde(default)]
    pub favorite_id: Option<String>,
    pub book_id: String,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_author: String,
    #[serde(default)]
    pub book_cover: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub history_id: String,
    pub book_id: String,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_author: String,
    #[serde(default)]
    pub book_cover: String,
    #[serde(default)]
    pub view_time: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteCheck {
    #[serde(alias = "is_favorited", alias = "favorited")]
    pub is_favorite: bool,
}
