use serde_json::json;

use fluxlib_client::{
    api::transport::Method,
    interaction::AutoConfirm,
    models::{BookDraft, BookStatus, BorrowStatus},
    services::events::{drain, Event},
    views::{
        book_detail::BookDetailView,
        borrow_manage::{BorrowManageView, SortOrder},
        catalog::CatalogView,
    },
};

use crate::common::{book, fresh_app, login};

#[tokio::test]
async fn test_borrow_from_detail_shows_in_catalog() {
    let (transport, _, state) = fresh_app();
    login(&transport, &state, "tok-1").await;
    let services = &state.services;

    transport.reply(
        Method::Get,
        "/books?page=1&size=12",
        200,
        json!({"items": [book("b1", 1), book("b2", 3)], "total": 2}),
    );
    transport.reply(Method::Get, "/books/b1", 200, book("b1", 1));
    transport.reply(Method::Get, "/favorites/b1/check", 200, json!({"is_favorite": false}));
    transport.reply(Method::Post, "/books/b1/borrow", 200, json!({"success": true, "borrow_id": "r1"}));

    let mut catalog = CatalogView::new(services.books.clone(), services.events.clone());
    catalog.load().await.unwrap();
    assert_eq!(catalog.visible().len(), 2);

    let mut detail = BookDetailView::new("b1", services.gateway.clone(), services.books.clone(), services.events.clone());
    detail.load().await.unwrap();
    detail.borrow().await.unwrap();

    catalog.sync().await;
    let b1 = &catalog.visible()[0];
    assert_eq!(b1.stock, 0);
    assert_eq!(b1.status, BookStatus::Borrowed);
    assert_eq!(services.books.current().await.map(|b| b.stock), Some(0));

    let borrow = &transport.requests_to(Method::Post, "/books/b1/borrow")[0];
    assert_eq!(borrow.bearer.as_deref(), Some("tok-1"));
    assert_eq!(borrow.body_json(), Some(json!({"days": 30})));
}

#[tokio::test]
async fn test_new_book_reaches_other_subscribers() {
    let (transport, _, state) = fresh_app();
    login(&transport, &state, "tok-admin").await;
    transport.reply(Method::Post, "/books", 201, json!({"book_id": "b7"}));
    let mut rx = state.services.events.subscribe();

    let draft = BookDraft {
        title: "The Dispossessed".into(),
        author: "Ursula K. Le Guin".into(),
        category: "literature".into(),
        ..Default::default()
    };
    let created = state.services.books.create(&draft).await.unwrap();

    assert_eq!(created.id, "b7");
    assert!(drain(&mut rx).contains(&Event::BookAdded { book_id: "b7".into() }));
    assert_eq!(state.services.books.total().await, 1);
}

#[tokio::test]
async fn test_batch_return_updates_records() {
    let (transport, _, state) = fresh_app();
    login(&transport, &state, "tok-1").await;
    transport.reply(
        Method::Get,
        "/user/borrows",
        200,
        json!({"items": [
            {"borrow_id": "r1", "book_id": "b1", "borrow_date": 100, "status": "returned"},
            {"borrow_id": "r2", "book_id": "b2", "borrow_date": 300, "status": "borrowed"},
            {"borrow_id": "r3", "book_id": "b3", "borrow_date": 200, "status": "borrowed"}
        ]}),
    );
    transport.reply(Method::Post, "/batch-return", 200, json!({"success": true, "returned_count": 2}));

    let mut view = BorrowManageView::new(state.services.borrows.clone(), state.services.events.clone());
    view.load().await.unwrap();
    view.sort_by(SortOrder::Date).await;
    view.set_selection(vec!["r2".into(), "r3".into()]);

    assert_eq!(view.return_selected(&AutoConfirm(true)).await.unwrap(), 2);

    let records = view.records().await;
    assert!(records.iter().all(|r| r.status == BorrowStatus::Returned && !r.returning));
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["r2", "r3", "r1"]);

    let sent = &transport.requests_to(Method::Post, "/batch-return")[0];
    assert_eq!(sent.body_json(), Some(json!({"borrow_ids": ["r2", "r3"]})));
}
