//! Book reservations

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reservation request; date and time slot are free-form strings chosen in the UI
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ReservationRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub reserve_date: String,
    #[validate(length(min = 1, message = "is required"))]
    pub time_slot: String,
    #[validate(range(min = 1, max = 365))]
    pub days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
