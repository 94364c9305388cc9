//! Response envelope decoding
//!
//! Some backend functions answer `{"statusCode": 200, "body": "<json text>"}`:
//! the real payload is serialized a second time inside `body`. Decoding
//! substitutes that payload so callers only ever see the effective data.

use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Field holding the nested serialized payload
const NESTED_FIELD: &str = "body";

/// Decoded response body
#[derive(Debug)]
pub struct Decoded {
    pub data: Value,
    /// Set when a nested payload was present but failed to parse; `data`
    /// then holds the outer object unchanged.
    pub nested_error: Option<AppError>,
}

/// Decode a raw response body. An empty body decodes to `null`; a body that
/// is not JSON at all is a `Decode` error.
pub fn decode(raw: &str) -> AppResult<Decoded> {
    if raw.trim().is_empty() {
        return Ok(Decoded {
            data: Value::Null,
            nested_error: None,
        });
    }

    let outer: Value = serde_json::from_str(raw)?;

    let nested = match outer.get(NESTED_FIELD) {
        Some(Value::String(text)) => serde_json::from_str::<Value>(text),
        _ => {
            return Ok(Decoded {
                data: outer,
                nested_error: None,
            })
        }
    };

    Ok(match nested {
        Ok(data) => Decoded {
            data,
            nested_error: None,
        },
        Err(e) => Decoded {
            data: outer,
            nested_error: Some(AppError::Decode(format!("nested body: {}", e))),
        },
    })
}
