//! # cath-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the publication API.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use cath_account_client::{AccountClientConfig, HttpAccountService};
use cath_api::config::AppConfig;
use cath_api::state::AppState;
use cath_publication::memory::{InMemoryArtefactStore, InMemoryBlobStore, StaticAccountService};
use cath_publication::{AccountService, ArtefactStore, BlobStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Initialize database pool (optional, absent means in-memory only).
    let db_pool = cath_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let (store, blobs): (Arc<dyn ArtefactStore>, Arc<dyn BlobStore>) = match &db_pool {
        Some(pool) => (
            Arc::new(cath_api::db::PgArtefactStore::new(pool.clone())),
            Arc::new(cath_api::db::PgBlobStore::new(pool.clone())),
        ),
        None => (
            Arc::new(InMemoryArtefactStore::new()),
            Arc::new(InMemoryBlobStore::new()),
        ),
    };

    // Account collaborator: HTTP client when a base URL is configured,
    // otherwise an empty static service that resolves no identities.
    let accounts: Arc<dyn AccountService> = match &config.account_base_url {
        Some(base_url) => {
            let mut client_config = AccountClientConfig::new(base_url.clone());
            if let Some(token) = &config.account_token {
                client_config = client_config.with_token(token.clone());
            }
            tracing::info!("Account service client configured for {base_url}");
            Arc::new(HttpAccountService::new(client_config)?)
        }
        None => {
            tracing::warn!(
                "CATH_ACCOUNT_BASE_URL not set — requester identities will not resolve, \
                 so gated reads and all writes will be denied."
            );
            Arc::new(StaticAccountService::new())
        }
    };

    let port = config.port;
    let state = AppState::with_ports(config, store, blobs, accounts, db_pool);
    let app = cath_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("cath-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
