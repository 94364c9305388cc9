//! HTTP transport: the only place that talks to the network

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Bytes { content_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Body>,
}

impl HttpRequest {
    /// JSON payload, if the request carries one
    pub fn body_json(&self) -> Option<Value> {
        match &self.body {
            Some(Body::Json(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request. Failing to get any response (including a timeout)
/// is reported as `AppError::Network`; every status code is a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse>;
}

/// `reqwest`-backed transport with a fixed request timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let mut builder = self.client.request(request.method.into(), &request.url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            Some(Body::Json(value)) => builder.json(&value),
            Some(Body::Bytes { content_type, data }) => builder.header(CONTENT_TYPE, content_type).body(data),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Network(format!("Request timed out: {}", request.url))
            } else {
                AppError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Offline,
}

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<Reply>,
    last: Option<Reply>,
}

/// In-memory transport replaying scripted replies.
///
/// Replies are matched on method and URL suffix (path plus query). Each
/// route holds a queue; once it is drained the last served reply is reused
/// for every later request. Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(Method, String), Script>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, so concurrent requests overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, body.to_string());
    }

    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(
            method,
            path,
            Reply::Respond(HttpResponse {
                status,
                body: body.into(),
            }),
        );
    }

    /// Simulate a request that never gets a response
    pub fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Reply::Offline);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.ends_with(path))
            .collect()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .pending
            .push_back(reply);
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        let script = replies
            .iter_mut()
            .filter(|((method, path), _)| *method == request.method && request.url.ends_with(path.as_str()))
            // Longest suffix wins: "/books/1/borrow" over "/borrow"
            .max_by_key(|((_, path), _)| path.len())
            .map(|(_, script)| script)?;

        if let Some(reply) = script.pending.pop_front() {
            script.last = Some(reply.clone());
        }
        script.last.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let reply = self.next_reply(&request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Offline) => Err(AppError::Network(format!("No response from {}", request.url))),
            None => Ok(HttpResponse {
                status: 404,
                body: serde_json::json!({"error": "not scripted"}).to_string(),
            }),
        }
    }
}
