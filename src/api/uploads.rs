//! Object-storage upload tickets

use super::Gateway;
use crate::{error::AppResult, models::upload::UploadTicket};

pub async fn presigned_url(gateway: &Gateway, file_name: &str, file_type: &str) -> AppResult<UploadTicket> {
    gateway
        .get_with_query(
            "/presigned-url",
            &[("file_name", file_name.to_string()), ("file_type", file_type.to_string())],
        )
        .await
}
