use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_err;

use fluxlib_client::{
    api::{
        self,
        transport::{Method, ScriptedTransport},
    },
    models::{BookQuery, Profile},
    services::{
        events::{drain, Event, Route},
        storage::{FileStorage, MemoryStorage, Storage},
    },
    Notice,
};

use crate::common::{self, app, book, fresh_app, login};

#[tokio::test]
async fn test_session_survives_restart() {
    let transport = Arc::new(ScriptedTransport::new());
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let first = app(transport.clone(), storage.clone());
    login(&transport, &first, "tok-1").await;
    drop(first);

    let second = app(transport.clone(), storage);
    let session = second.services.session.session();
    assert!(session.is_authenticated().await);
    assert_eq!(session.user_id().await.as_deref(), Some("u1"));

    transport.reply(Method::Get, "/user/borrows", 200, json!([]));
    second.services.borrows.fetch_mine().await.unwrap();
    let sent = transport.requests_to(Method::Get, "/user/borrows");
    assert_eq!(sent[0].bearer.as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_file_storage_keeps_session() {
    let path = std::env::temp_dir().join(format!("fluxlib-session-{}.json", std::process::id()));
    let transport = Arc::new(ScriptedTransport::new());

    {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&path).unwrap());
        let state = app(transport.clone(), storage);
        login(&transport, &state, "tok-file").await;
    }

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&path).unwrap());
    let state = app(transport, storage);
    assert_eq!(
        state.services.session.session().token().await.as_deref(),
        Some("tok-file")
    );

    state.services.logout().await;
    let storage = FileStorage::open(&path).unwrap();
    assert_eq!(storage.get("token"), None);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_unauthorized_tears_down_once() {
    let transport = Arc::new(ScriptedTransport::new().with_latency(Duration::from_millis(50)));
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let state = app(transport.clone(), storage.clone());
    login(&transport, &state, "tok-1").await;

    transport.reply(Method::Get, "/books?page=1&size=10", 401, json!({"error": "token expired"}));
    transport.reply(Method::Get, "/user/borrows", 401, json!({"error": "token expired"}));
    transport.reply(Method::Get, "/user/current", 401, json!({"error": "token expired"}));

    let services = &state.services;
    let mut rx = services.events.subscribe();
    let query = BookQuery::default();

    let (books, borrows, current) = tokio::join!(
        services.books.fetch_list(&query),
        services.borrows.fetch_mine(),
        api::users::current(&services.gateway),
    );

    assert_err!(books);
    assert_err!(borrows);
    assert_err!(current);
    assert!(!services.session.session().is_authenticated().await);
    assert_eq!(storage.get("token"), None);

    let events = drain(&mut rx);
    let count = |wanted: &Event| events.iter().filter(|e| *e == wanted).count();
    assert_eq!(count(&Event::UserChanged), 1);
    assert_eq!(count(&Event::Notice(Notice::SessionExpired)), 1);
    assert_eq!(count(&Event::Navigate(Route::Login)), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_unauthorized_keeps_newer_session() {
    let transport = Arc::new(ScriptedTransport::new().with_latency(Duration::from_millis(50)));
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let state = app(transport.clone(), storage);
    login(&transport, &state, "tok-old").await;

    transport.reply(Method::Get, "/books/b1", 401, json!({"error": "token expired"}));
    let books = state.services.books.clone();
    let pending = tokio::spawn(async move { books.fetch_one("b1").await });

    // The request is in flight under the old token when a new session starts
    tokio::time::sleep(Duration::from_millis(10)).await;
    let profile = Profile {
        user_id: "u2".into(),
        ..Default::default()
    };
    state
        .services
        .session
        .session()
        .establish("tok-new".into(), profile)
        .await
        .unwrap();

    assert!(pending.await.unwrap().is_err());
    assert_eq!(
        state.services.session.session().token().await.as_deref(),
        Some("tok-new")
    );
}

#[tokio::test]
async fn test_failed_login_leaves_session_alone() {
    let (transport, _, state) = fresh_app();
    transport.reply(Method::Post, "/login", 401, json!({"error": "wrong password"}));
    let mut rx = state.services.events.subscribe();

    let err = state.services.session.login(&common::credentials()).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!state.services.session.session().is_authenticated().await);
    assert!(!drain(&mut rx).contains(&Event::UserChanged));
}

#[tokio::test]
async fn test_logout_clears_cached_resources() {
    let (transport, _, state) = fresh_app();
    login(&transport, &state, "tok-1").await;
    transport.reply(Method::Get, "/books?page=1&size=10", 200, json!({"items": [book("b1", 2)], "total": 1}));
    state.services.books.fetch_list(&BookQuery::default()).await.unwrap();

    state.services.logout().await;

    assert!(state.services.books.books().await.is_empty());
    assert_eq!(state.services.books.total().await, 0);
    assert!(!state.services.session.session().is_authenticated().await);
}

#[tokio::test]
async fn test_expired_session_clears_cached_resources() {
    let (transport, _, state) = fresh_app();
    login(&transport, &state, "tok-1").await;
    let services = &state.services;

    transport.reply(Method::Get, "/books?page=1&size=10", 200, json!({"items": [book("b1", 2)], "total": 1}));
    transport.reply(
        Method::Get,
        "/user/borrows",
        200,
        json!([{"borrow_id": "r1", "book_id": "b1", "borrow_date": 100, "status": "borrowed"}]),
    );
    services.books.fetch_list(&BookQuery::default()).await.unwrap();
    services.borrows.fetch_mine().await.unwrap();
    assert_eq!(services.borrows.records().await.len(), 1);

    transport.reply(Method::Get, "/user/current", 401, json!({"error": "token expired"}));
    assert_err!(api::users::current(&services.gateway).await);

    assert!(!services.session.session().is_authenticated().await);
    assert!(services.books.books().await.is_empty());
    assert_eq!(services.books.total().await, 0);
    assert!(services.borrows.records().await.is_empty());
}
