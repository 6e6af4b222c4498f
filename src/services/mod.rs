//! Business logic services

pub mod catalog;
pub mod loans;
pub mod openlibrary;
pub mod ranking;
pub mod reading;

use std::sync::Arc;

use crate::{config::CatalogConfig, error::AppResult, repository::Repository};

use openlibrary::{CatalogLookup, NoCatalog, OpenLibraryClient};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub reading: reading::ReadingService,
    pub ranking: ranking::RankingService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: &CatalogConfig) -> AppResult<Self> {
        let lookup: Arc<dyn CatalogLookup> = if catalog_config.enabled {
            Arc::new(OpenLibraryClient::new(catalog_config)?)
        } else {
            tracing::info!("Catalog enrichment disabled");
            Arc::new(NoCatalog)
        };

        Ok(Self::with_lookup(repository, lookup))
    }

    /// Create all services with an explicit catalog lookup
    pub fn with_lookup(repository: Repository, lookup: Arc<dyn CatalogLookup>) -> Self {
        let catalog = catalog::CatalogService::new(repository.clone(), lookup);
        Self {
            loans: loans::LoansService::new(repository.clone(), catalog.clone()),
            reading: reading::ReadingService::new(repository.clone()),
            ranking: ranking::RankingService::new(repository.clone()),
            catalog,
            repository,
        }
    }
}
