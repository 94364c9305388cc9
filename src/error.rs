//! Error types for the FluxLib client

use thiserror::Error;

/// User-facing notices raised by the gateway and the view models.
///
/// The first four variants are the fixed messages the gateway emits on its
/// error path; the others carry a context-specific message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SessionExpired,
    PermissionDenied,
    ServerUnavailable,
    Connectivity,
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::SessionExpired => "Your session has expired, please log in again",
            Notice::PermissionDenied => "You do not have permission to perform this action",
            Notice::ServerUnavailable => "The server is unavailable, please try again later",
            Notice::Connectivity => "Network error, please check your connection",
            Notice::Success(msg) | Notice::Warning(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Success(_) | Notice::Warning(_))
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// No response was received (connection failure or timeout)
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Envelope or JSON parse failure
    #[error("Decode error: {0}")]
    Decode(String),

    /// Well-formed JSON missing the expected fields
    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    /// Client-side check failed before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server answered 2xx but reported `success: false`
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The notice the gateway raises for this error, if any.
    ///
    /// Client-side errors (validation, shape, storage) and ordinary 4xx
    /// answers produce none: callers decide whether to show a message.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            AppError::Network(_) => Some(Notice::Connectivity),
            AppError::Http { status: 401, .. } => Some(Notice::SessionExpired),
            AppError::Http { status: 403, .. } => Some(Notice::PermissionDenied),
            AppError::Http { status, .. } if *status >= 500 => Some(Notice::ServerUnavailable),
            _ => None,
        }
    }

    /// Message suitable for a context-specific notice ("Borrow failed: ...").
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http { message, .. } => message.clone(),
            AppError::Rejected(msg) | AppError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{} {}", field, reason)
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join(", "))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
