//! Business logic services

pub mod aggregation;
pub mod catalog;
pub mod consistency;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: &CatalogConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository, catalog_config.strict_delete),
        }
    }
}
