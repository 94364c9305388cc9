//! User profile, credentials and account request types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Profile of the logged-in user.
///
/// Every field defaults to an empty string, `false` or zero, whether it is
/// missing or `null`, so that partially filled server answers normalize to
/// the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_temporary_admin: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub background_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Profile {
    /// Shallow merge of a server user object. Unknown keys are dropped,
    /// `null` values leave the current field alone.
    pub fn merge(&mut self, update: &Value) -> AppResult<()> {
        let Value::Object(fields) = update else {
            return Err(AppError::ResponseShape("user profile is not an object".to_string()));
        };

        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(target) = &mut current {
            for (key, value) in fields {
                if !value.is_null() && target.contains_key(key) {
                    target.insert(key.clone(), value.clone());
                }
            }
        }

        *self = serde_json::from_value(current)
            .map_err(|e| AppError::ResponseShape(format!("user profile: {}", e)))?;
        Ok(())
    }

    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        if self.created_at <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.created_at, 0).single()
    }

    /// Whole days since registration, rounded up; 0 when unknown
    pub fn member_days(&self, now: DateTime<Utc>) -> i64 {
        match self.joined_at() {
            Some(joined) => {
                let seconds = (now - joined).num_seconds().abs();
                (seconds + 86_399) / 86_400
            }
            None => 0,
        }
    }

    pub fn gender_label(&self) -> &'static str {
        match self.gender.as_str() {
            "male" => "Male",
            "female" => "Female",
            "other" => "Other",
            _ => "Not set",
        }
    }
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    /// Optional code granting temporary admin rights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_code: Option<String>,
}

/// Login answer: the token plus the flattened profile fields
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Registration request
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "is not a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(equal = 6, message = "must be 6 digits"))]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
}

/// Request body carrying a single email address
#[derive(Debug, Clone, Serialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "is not a valid address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(email(message = "is not a valid address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "must be 6 digits"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "is not a valid address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "must be 6 digits"))]
    pub code: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub new_password: String,
}

/// `{message}` / `{error}` answer of the account endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Profile fields the user may edit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub user: Option<Value>,
}
