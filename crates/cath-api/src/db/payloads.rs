//! Payload blob persistence over Postgres.
//!
//! Content-addressed: the digest is the key, so re-storing identical
//! bytes is a no-op and updates never overwrite an older version's
//! payload. Secondary-file requests are queued in a table the
//! conversion worker drains out of band.

use async_trait::async_trait;
use sqlx::PgPool;

use cath_core::{ArtefactId, PayloadDigest, PublicationError};
use cath_publication::BlobStore;

/// Postgres-backed blob store.
#[derive(Debug, Clone)]
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn store(&self, bytes: &[u8]) -> Result<PayloadDigest, PublicationError> {
        let digest = PayloadDigest::of(bytes);
        sqlx::query(
            "INSERT INTO payloads (digest, bytes) VALUES ($1, $2)
             ON CONFLICT (digest) DO NOTHING",
        )
        .bind(digest.as_hex())
        .bind(bytes)
        .execute(&self.pool)
        .await
        .map_err(blob_error)?;
        Ok(digest)
    }

    async fn fetch(&self, digest: &PayloadDigest) -> Result<Vec<u8>, PublicationError> {
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT bytes FROM payloads WHERE digest = $1")
                .bind(digest.as_hex())
                .fetch_optional(&self.pool)
                .await
                .map_err(blob_error)?;
        row.map(|(bytes,)| bytes)
            .ok_or_else(|| PublicationError::Blob(format!("no payload for digest {digest}")))
    }

    async fn request_secondary_file(
        &self,
        artefact_id: ArtefactId,
        payload: &[u8],
    ) -> Result<(), PublicationError> {
        let digest = PayloadDigest::of(payload);
        sqlx::query(
            "INSERT INTO secondary_file_requests (artefact_id, payload_digest)
             VALUES ($1, $2)",
        )
        .bind(artefact_id.as_uuid())
        .bind(digest.as_hex())
        .execute(&self.pool)
        .await
        .map_err(blob_error)?;
        Ok(())
    }
}

fn blob_error(e: sqlx::Error) -> PublicationError {
    PublicationError::Blob(e.to_string())
}
