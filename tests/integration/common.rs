use serde_json::{json, Value};
use std::sync::Arc;

use fluxlib_client::{
    api::transport::{Method, ScriptedTransport},
    config::AppConfig,
    models::user::Credentials,
    services::storage::{MemoryStorage, Storage},
    AppState,
};

pub const BASE_URL: &str = "http://api.test/api";

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = BASE_URL.to_string();
    config
}

pub fn app(transport: Arc<ScriptedTransport>, storage: Arc<dyn Storage>) -> AppState {
    AppState::with_parts(config(), transport, storage)
}

pub fn fresh_app() -> (Arc<ScriptedTransport>, Arc<dyn Storage>, AppState) {
    let transport = Arc::new(ScriptedTransport::new());
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let state = app(transport.clone(), storage.clone());
    (transport, storage, state)
}

pub fn book(id: &str, stock: u32) -> Value {
    json!({
        "book_id": id,
        "title": format!("Book {}", id),
        "author": "Ursula K. Le Guin",
        "category": "literature",
        "stock": stock,
        "status": if stock > 0 { "available" } else { "borrowed" }
    })
}

pub fn credentials() -> Credentials {
    Credentials {
        email: "reader@example.com".into(),
        password: "secret1".into(),
        admin_code: None,
    }
}

/// Script a successful login and perform it
pub async fn login(transport: &ScriptedTransport, state: &AppState, token: &str) {
    transport.reply(
        Method::Post,
        "/login",
        200,
        json!({"token": token, "user_id": "u1", "email": "reader@example.com", "role": "user"}),
    );
    state.services.session.login(&credentials()).await.unwrap();
}
