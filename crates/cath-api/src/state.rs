//! # Application State
//!
//! Shared state behind every route handler: the publication service,
//! the account collaborator port, and the optional database pool used
//! by the readiness probe. All fields are cheaply cloneable.

use std::sync::Arc;

use sqlx::PgPool;

use cath_publication::memory::{InMemoryArtefactStore, InMemoryBlobStore, StaticAccountService};
use cath_publication::{AccountService, ArtefactStore, BlobStore, PublicationService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: Arc<PublicationService>,
    pub accounts: Arc<dyn AccountService>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// In-memory state with no external collaborators. Identities never
    /// resolve, so every write and gated read is denied; used by tests
    /// that build their own account service, and by bare dev runs.
    pub fn new() -> Self {
        Self::with_ports(
            AppConfig::default(),
            Arc::new(InMemoryArtefactStore::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(StaticAccountService::new()),
            None,
        )
    }

    /// Assemble state from explicit ports.
    pub fn with_ports(
        config: AppConfig,
        store: Arc<dyn ArtefactStore>,
        blobs: Arc<dyn BlobStore>,
        accounts: Arc<dyn AccountService>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let service = Arc::new(PublicationService::new(
            store,
            blobs,
            Arc::clone(&accounts),
            config.max_secondary_file_bytes,
        ));
        Self {
            config,
            service,
            accounts,
            db_pool,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
