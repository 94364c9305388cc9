//! Per-screen view models
//!
//! Each view model owns the transient UI state of one screen and calls the
//! stores or the gateway. The gateway already raises notices for network
//! failures, expired sessions, forbidden actions and server faults; views
//! only add context-specific messages for the rest.

pub mod book_detail;
pub mod book_form;
pub mod borrow_manage;
pub mod catalog;
pub mod chat;
pub mod comments;
pub mod countdown;
pub mod forgot_password;
pub mod geometry;
pub mod home;
pub mod login;
pub mod profile;

use crate::{
    error::{AppError, Notice},
    services::events::EventBus,
};

/// Whether the gateway already told the user about this error
pub(crate) fn already_reported(error: &AppError) -> bool {
    match error {
        AppError::Network(_) | AppError::Cancelled => true,
        AppError::Http { status, .. } => matches!(status, 401 | 403) || *status >= 500,
        _ => false,
    }
}

/// Emit "`action`: reason" unless the gateway already reported the error
pub(crate) fn report_failure(events: &EventBus, action: &str, error: &AppError) {
    if already_reported(error) {
        return;
    }
    events.notify(Notice::Error(format!("{}: {}", action, error.user_message())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_reported() {
        assert!(already_reported(&AppError::Network("down".into())));
        assert!(already_reported(&AppError::Http {
            status: 503,
            message: String::new()
        }));
        assert!(!already_reported(&AppError::Http {
            status: 404,
            message: String::new()
        }));
        assert!(!already_reported(&AppError::Rejected("no stock".into())));
    }
}
