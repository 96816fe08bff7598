//! Library catalog server
//!
//! Keeps authors, books, genres and book instances in a document store, assembles the
//! multi-collection views the catalog pages need, and refuses to delete an author or
//! genre while books still reference it.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services over `store`
    pub fn new(config: AppConfig, store: store::SharedStore) -> Self {
        let repository = repository::Repository::new(store);
        let services = services::Services::new(repository, &config.catalog);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
