//! Client-side state services

pub mod books;
pub mod borrows;
pub mod events;
pub mod session;
pub mod storage;

use std::sync::Arc;

use crate::{
    api::{
        transport::{ReqwestTransport, Transport},
        Gateway,
    },
    config::AppConfig,
    error::AppResult,
};

/// Container for all services.
///
/// Built once at start-up; every store shares the same session, event bus
/// and gateway. Handles are cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub events: events::EventBus,
    pub storage: Arc<dyn storage::Storage>,
    pub gateway: Gateway,
    pub session: session::SessionStore,
    pub books: books::BooksStore,
    pub borrows: borrows::BorrowsStore,
}

impl Services {
    /// Create all services against the configured API and state file
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.api.timeout())?);
        let storage = Arc::new(storage::FileStorage::open(&config.storage.path)?);
        Ok(Self::with_parts(config, transport, storage))
    }

    /// Create all services over an explicit transport and storage
    pub fn with_parts(config: &AppConfig, transport: Arc<dyn Transport>, storage: Arc<dyn storage::Storage>) -> Self {
        let events = events::EventBus::default();
        let session = session::Session::restore(storage.clone(), events.clone());
        let gateway = Gateway::new(transport, config.api.base_url.clone(), session.clone(), events.clone());

        let books = books::BooksStore::new(gateway.clone(), events.clone());
        let borrows = borrows::BorrowsStore::new(gateway.clone());
        books.bind_to(&session);
        borrows.bind_to(&session);

        Self {
            session: session::SessionStore::new(gateway.clone(), session, events.clone()),
            books,
            borrows,
            gateway,
            storage,
            events,
        }
    }

    /// Log out; the bound stores drop their cached resources with the session
    pub async fn logout(&self) {
        self.session.logout().await;
    }
}
