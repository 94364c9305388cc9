//! Object-storage upload tickets and local image files

use serde::Deserialize;

/// Presigned upload: PUT the bytes to `presigned_url`, then link `access_url`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTicket {
    pub presigned_url: String,
    pub access_url: String,
}

/// Image picked by the user, read into memory
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Which profile image an upload replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    Background,
}

impl ImageSlot {
    pub fn label(&self) -> &'static str {
        match self {
            ImageSlot::Avatar => "Avatar",
            ImageSlot::Background => "Background",
        }
    }
}
