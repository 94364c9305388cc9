//! FluxLib client
//!
//! Client-side state and synchronization layer of the FluxLib library web
//! application: an authenticated HTTP gateway, the session, cached resource
//! stores for books and borrow records, and the view models of each screen.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod interaction;
pub mod models;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult, Notice};

/// Application state shared across every screen
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state over the real HTTP transport and the state file
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let services = services::Services::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }

    /// Build the state over an explicit transport and storage
    pub fn with_parts(
        config: AppConfig,
        transport: Arc<dyn api::transport::Transport>,
        storage: Arc<dyn services::storage::Storage>,
    ) -> Self {
        let services = services::Services::with_parts(&config, transport, storage);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
