//! # Database Persistence Layer
//!
//! Postgres persistence for artefact records and payload blobs via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the
//! API persists artefacts and payloads to PostgreSQL and enforces
//! business-key uniqueness with a unique constraint. When absent, the
//! API runs against in-memory stores (development and testing only).

pub mod artefacts;
pub mod payloads;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use artefacts::PgArtefactStore;
pub use payloads::PgBlobStore;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Artefacts will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
