//! Client for the FluxLib REST endpoints
//!
//! `Gateway` wraps every outgoing request: it attaches the bearer token,
//! decodes the response envelope and turns failures into user notices. The
//! submodules hold one typed function per endpoint.

pub mod ai;
pub mod announcements;
pub mod auth;
pub mod books;
pub mod borrows;
pub mod comments;
pub mod envelope;
pub mod transport;
pub mod uploads;
pub mod users;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, Notice},
    services::{
        events::{EventBus, Route},
        session::Session,
    },
};
use transport::{Body, HttpRequest, Method, Transport};

/// Decoded answer of a successful request
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
    /// Nested envelope payload that failed to parse; `data` is then the outer body
    pub decode_error: Option<AppError>,
}

impl ApiResponse {
    pub fn into_typed<T: DeserializeOwned>(self, what: &str) -> AppResult<T> {
        decode_as(self.data, what)
    }
}

/// Deserialize a decoded payload, reporting missing fields as a shape error
pub fn decode_as<T: DeserializeOwned>(data: Value, what: &str) -> AppResult<T> {
    serde_json::from_value(data).map_err(|e| AppError::ResponseShape(format!("{}: {}", what, e)))
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    base_url: String,
    session: Session,
    events: EventBus,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, session: Session, events: EventBus) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send(Method::Get, path, None).await?.into_typed(path)
    }

    /// GET with URL-encoded query parameters
    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let path = with_query(path, query)?;
        self.send(Method::Get, &path, None).await?.into_typed(&path)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> AppResult<T> {
        let body = serde_json::to_value(payload)?;
        self.send(Method::Post, path, Some(body)).await?.into_typed(path)
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send(Method::Post, path, None).await?.into_typed(path)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> AppResult<T> {
        let body = serde_json::to_value(payload)?;
        self.send(Method::Put, path, Some(body)).await?.into_typed(path)
    }

    pub async fn delete(&self, path: &str) -> AppResult<ApiResponse> {
        self.send(Method::Delete, path, None).await
    }

    /// Issue a request against the API base URL.
    ///
    /// Any status >= 400 becomes `AppError::Http` after the matching notice
    /// has been raised. A 401 additionally ends the session it was sent with,
    /// once, no matter how many in-flight requests come back unauthorized.
    pub async fn send(&self, method: Method, path: &str, payload: Option<Value>) -> AppResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let (bearer, epoch) = self.session.credential().await;

        tracing::debug!(%method, %url, authenticated = bearer.is_some(), "sending request");

        let request = HttpRequest {
            method,
            url: url.clone(),
            bearer,
            body: payload.map(Body::Json),
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(%method, %url, error = %err, "request failed without response");
                self.raise(&err);
                return Err(err);
            }
        };

        let decoded = match envelope::decode(&response.body) {
            Ok(decoded) => decoded,
            Err(err) if response.is_success() => {
                tracing::warn!(%method, %url, error = %err, "undecodable response body");
                return Err(err);
            }
            // The status decides for error answers, whatever the body
            Err(_) => envelope::Decoded {
                data: Value::Null,
                nested_error: None,
            },
        };

        if let Some(err) = &decoded.nested_error {
            tracing::warn!(%method, %url, error = %err, "failed to decode nested response body");
        }

        if !response.is_success() {
            return Err(self.fail(method, &url, response.status, &decoded.data, epoch).await);
        }

        Ok(ApiResponse {
            status: response.status,
            data: decoded.data,
            decode_error: decoded.nested_error,
        })
    }

    /// Upload raw bytes to an absolute (presigned) URL, without credentials
    pub async fn upload(&self, url: &str, content_type: &str, data: Vec<u8>) -> AppResult<()> {
        let request = HttpRequest {
            method: Method::Put,
            url: url.to_string(),
            bearer: None,
            body: Some(Body::Bytes {
                content_type: content_type.to_string(),
                data,
            }),
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "upload failed without response");
                self.raise(&err);
                return Err(err);
            }
        };
        if response.is_success() {
            return Ok(());
        }

        let error = AppError::Http {
            status: response.status,
            message: format!("Upload failed: {}", response.status),
        };
        tracing::warn!(status = response.status, error = %error, "upload rejected by storage");

        // The presigned URL carries its own credentials, the session stays untouched
        if error.is_unauthorized() {
            self.events.notify(Notice::PermissionDenied);
        } else {
            self.raise(&error);
        }
        Err(error)
    }

    fn raise(&self, error: &AppError) {
        if let Some(notice) = error.notice() {
            self.events.notify(notice);
        }
    }

    async fn fail(&self, method: Method, url: &str, status: u16, data: &Value, epoch: u64) -> AppError {
        let message = data
            .get("error")
            .or_else(|| data.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        let error = AppError::Http { status, message };

        if error.is_unauthorized() {
            // Only the first 401 for the session that sent the request tears
            // it down; a 401 without a session (bad login) is a plain error.
            if !self.session.expire(epoch).await {
                tracing::debug!(%method, %url, "unauthorized answer for an already closed session");
                return error;
            }
            tracing::warn!(%method, %url, "session expired");
        } else if status >= 500 {
            tracing::error!(%method, %url, status, error = %error, "server error");
        } else {
            tracing::warn!(%method, %url, status, error = %error, "request rejected");
        }

        self.raise(&error);
        if error.is_unauthorized() {
            self.events.navigate(Route::Login);
        }

        error
    }
}

fn with_query(path: &str, query: &[(&str, String)]) -> AppResult<String> {
    if query.is_empty() {
        return Ok(path.to_string());
    }
    // Only the query part matters; the base is a placeholder
    let url = reqwest::Url::parse_with_params(&format!("http://localhost{}", path), query)
        .map_err(|e| AppError::Validation(format!("invalid query for {}: {}", path, e)))?;
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::services::events::{drain, Event};
    use crate::services::storage::{MemoryStorage, Storage};
    use serde_json::json;
    use transport::ScriptedTransport;

    fn setup() -> (Arc<ScriptedTransport>, Gateway, EventBus) {
        let transport = Arc::new(ScriptedTransport::new());
        let events = EventBus::default();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let session = Session::restore(storage, events.clone());
        let gateway = Gateway::new(transport.clone(), "http://api.test/api/", session, events.clone());
        (transport, gateway, events)
    }

    async fn login(gateway: &Gateway) {
        gateway
            .session()
            .establish("tok-1".to_string(), Profile::default())
            .await
            .unwrap();
    }

    #[test]
    fn test_with_query_encodes_values() {
        let path = with_query("/presigned-url", &[("file_name", "my cover.png".to_string())]).unwrap();
        assert_eq!(path, "/presigned-url?file_name=my+cover.png");
        assert_eq!(with_query("/books", &[]).unwrap(), "/books");
    }

    #[tokio::test]
    async fn test_bearer_attached_only_with_session() {
        let (transport, gateway, _) = setup();
        transport.reply(Method::Get, "/announcements", 200, json!([]));

        let _: Value = gateway.get("/announcements").await.unwrap();
        login(&gateway).await;
        let _: Value = gateway.get("/announcements").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://api.test/api/announcements");
        assert_eq!(requests[0].bearer, None);
        assert_eq!(requests[1].bearer.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_envelope_is_unwrapped() {
        let (transport, gateway, _) = setup();
        transport.reply(
            Method::Get,
            "/user/borrows",
            200,
            json!({"statusCode": 200, "body": "{\"items\": []}"}),
        );

        let data: Value = gateway.get("/user/borrows").await.unwrap();
        assert_eq!(data, json!({"items": []}));
    }

    #[tokio::test]
    async fn test_nested_decode_error_is_attached() {
        let (transport, gateway, _) = setup();
        transport.reply(Method::Get, "/history", 200, json!({"body": "{broken"}));

        let response = gateway.send(Method::Get, "/history", None).await.unwrap();
        assert!(matches!(response.decode_error, Some(AppError::Decode(_))));
        assert_eq!(response.data["body"], "{broken");
    }

    #[tokio::test]
    async fn test_missing_fields_are_shape_errors() {
        let (transport, gateway, _) = setup();
        transport.reply(Method::Get, "/favorites/b1/check", 200, json!({"unexpected": true}));

        let result: AppResult<crate::models::favorite::FavoriteCheck> = gateway.get("/favorites/b1/check").await;
        assert!(matches!(result, Err(AppError::ResponseShape(_))));
    }

    #[tokio::test]
    async fn test_forbidden_notifies_without_teardown() {
        let (transport, gateway, events) = setup();
        login(&gateway).await;
        let mut rx = events.subscribe();
        transport.reply(Method::Delete, "/books/b1", 403, json!({"error": "admin only"}));

        let err = gateway.delete("/books/b1").await.unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.user_message(), "admin only");
        assert!(gateway.session().is_authenticated().await);
        assert_eq!(drain(&mut rx), vec![Event::Notice(Notice::PermissionDenied)]);
    }

    #[tokio::test]
    async fn test_server_fault_and_network_notices() {
        let (transport, gateway, events) = setup();
        let mut rx = events.subscribe();
        transport.reply_raw(Method::Get, "/books/b1", 502, "<html>bad gateway</html>");
        transport.fail(Method::Get, "/books/b2");

        let fault = gateway.get::<Value>("/books/b1").await.unwrap_err();
        let offline = gateway.get::<Value>("/books/b2").await.unwrap_err();

        assert_eq!(fault.status(), Some(502));
        assert!(matches!(offline, AppError::Network(_)));
        assert_eq!(
            drain(&mut rx),
            vec![
                Event::Notice(Notice::ServerUnavailable),
                Event::Notice(Notice::Connectivity)
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_failures_raise_notices() {
        let (transport, gateway, events) = setup();
        login(&gateway).await;
        let mut rx = events.subscribe();
        transport.fail(Method::Put, "/put/offline.png");
        transport.reply(Method::Put, "/put/denied.png", 403, json!({}));
        transport.reply(Method::Put, "/put/expired.png", 401, json!({}));
        transport.reply_raw(Method::Put, "/put/down.png", 503, "unavailable");

        for name in ["offline", "denied", "expired", "down"] {
            let url = format!("https://bucket.test/put/{}.png", name);
            assert!(gateway.upload(&url, "image/png", vec![1, 2, 3]).await.is_err());
        }

        assert!(gateway.session().is_authenticated().await);
        assert_eq!(
            drain(&mut rx),
            vec![
                Event::Notice(Notice::Connectivity),
                Event::Notice(Notice::PermissionDenied),
                Event::Notice(Notice::PermissionDenied),
                Event::Notice(Notice::ServerUnavailable),
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_tears_down_session() {
        let (transport, gateway, events) = setup();
        login(&gateway).await;
        let mut rx = events.subscribe();
        transport.reply(Method::Get, "/user/current", 401, json!({"error": "expired"}));

        let err = gateway.get::<Value>("/user/current").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!gateway.session().is_authenticated().await);
        assert_eq!(
            drain(&mut rx),
            vec![
                Event::UserChanged,
                Event::Notice(Notice::SessionExpired),
                Event::Navigate(Route::Login)
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_without_session_is_plain_error() {
        let (transport, gateway, events) = setup();
        let mut rx = events.subscribe();
        transport.reply(Method::Post, "/login", 401, json!({"error": "wrong password"}));

        let err = gateway.post::<Value, _>("/login", &json!({})).await.unwrap_err();

        assert_eq!(err.user_message(), "wrong password");
        assert!(drain(&mut rx).is_empty());
    }
}
