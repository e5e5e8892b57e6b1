//! Artefact persistence over Postgres.
//!
//! Implements the core's [`ArtefactStore`] port. Business-key
//! uniqueness is the `artefacts_business_key` constraint; the upsert is
//! a single `INSERT … ON CONFLICT` so the lookup-then-upsert race
//! resolves inside the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cath_core::{
    Artefact, ArtefactId, ArtefactKind, BusinessKey, Language, ListType, LocationId,
    PayloadDigest, Provenance, PublicationError, SearchIndex, Sensitivity, SourceArtefactId,
};
use cath_publication::ArtefactStore;

/// Postgres-backed artefact store.
#[derive(Debug, Clone)]
pub struct PgArtefactStore {
    pool: PgPool,
}

impl PgArtefactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, source_artefact_id, provenance, list_type, location_id, \
     kind, sensitivity, language, display_from, display_to, content_date, \
     payload_ref, search, last_received_at, superseded_count";

#[async_trait]
impl ArtefactStore for PgArtefactStore {
    async fn find_by_business_key(
        &self,
        key: &BusinessKey,
    ) -> Result<Option<Artefact>, PublicationError> {
        let row = sqlx::query_as::<_, ArtefactRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM artefacts
             WHERE source_artefact_id = $1 AND provenance = $2
               AND list_type = $3 AND location_id = $4"
        ))
        .bind(key.source_artefact_id.as_str())
        .bind(key.provenance.as_str())
        .bind(key.list_type.as_str())
        .bind(key.location_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(ArtefactRow::into_artefact).transpose()
    }

    async fn get(&self, id: ArtefactId) -> Result<Option<Artefact>, PublicationError> {
        let row = sqlx::query_as::<_, ArtefactRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM artefacts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(ArtefactRow::into_artefact).transpose()
    }

    async fn upsert(&self, artefact: Artefact) -> Result<ArtefactId, PublicationError> {
        let search = serde_json::to_value(&artefact.search)
            .map_err(|e| PublicationError::Storage(format!("search index encode: {e}")))?;

        // The ON CONFLICT update only fires when the existing row carries
        // the same artefact id. A concurrent ingestion that claimed the
        // key under another id leaves rows_affected at zero, which is the
        // conflict signal the resolver retries on.
        let result = sqlx::query(
            "INSERT INTO artefacts (id, source_artefact_id, provenance, list_type,
                 location_id, kind, sensitivity, language, display_from, display_to,
                 content_date, payload_ref, search, last_received_at, superseded_count)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             ON CONFLICT ON CONSTRAINT artefacts_business_key DO UPDATE SET
                 kind = EXCLUDED.kind,
                 sensitivity = EXCLUDED.sensitivity,
                 language = EXCLUDED.language,
                 display_from = EXCLUDED.display_from,
                 display_to = EXCLUDED.display_to,
                 content_date = EXCLUDED.content_date,
                 payload_ref = EXCLUDED.payload_ref,
                 search = EXCLUDED.search,
                 last_received_at = EXCLUDED.last_received_at,
                 superseded_count = EXCLUDED.superseded_count
             WHERE artefacts.id = EXCLUDED.id",
        )
        .bind(artefact.id.as_uuid())
        .bind(artefact.source_artefact_id.as_str())
        .bind(artefact.provenance.as_str())
        .bind(artefact.list_type.as_str())
        .bind(artefact.location_id.as_str())
        .bind(artefact.kind.as_str())
        .bind(artefact.sensitivity.as_str())
        .bind(artefact.language.as_str())
        .bind(artefact.display_from)
        .bind(artefact.display_to)
        .bind(artefact.content_date)
        .bind(artefact.payload_ref.as_hex())
        .bind(search)
        .bind(artefact.last_received_at)
        .bind(artefact.superseded_count as i32)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(PublicationError::BusinessKeyConflict(
                artefact.business_key().to_string(),
            ));
        }
        Ok(artefact.id)
    }

    async fn delete_by_id(&self, id: ArtefactId) -> Result<bool, PublicationError> {
        let result = sqlx::query("DELETE FROM artefacts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, PublicationError> {
        let result = sqlx::query("DELETE FROM artefacts WHERE display_to < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_by_location_prefix(&self, prefix: &str) -> Result<u64, PublicationError> {
        let result = sqlx::query("DELETE FROM artefacts WHERE starts_with(location_id, $1)")
            .bind(prefix)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected())
    }

    async fn search_case_id(&self, value: &str) -> Result<Vec<Artefact>, PublicationError> {
        // Exact match on either identifier kind via JSONB containment,
        // served by the GIN index on `search`.
        let rows = sqlx::query_as::<_, ArtefactRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM artefacts
             WHERE search -> 'entries' @> jsonb_build_array(
                       jsonb_build_object('kind', 'CASE_NUMBER', 'term', $1::text))
                OR search -> 'entries' @> jsonb_build_array(
                       jsonb_build_object('kind', 'CASE_URN', 'term', $1::text))"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(ArtefactRow::into_artefact).collect()
    }

    async fn search_case_name(&self, fragment: &str) -> Result<Vec<Artefact>, PublicationError> {
        let rows = sqlx::query_as::<_, ArtefactRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM artefacts
             WHERE EXISTS (
                 SELECT 1 FROM jsonb_array_elements(search -> 'entries') entry
                 WHERE entry ->> 'kind' = 'CASE_NAME'
                   AND position(lower($1) IN lower(entry ->> 'term')) > 0
             )"
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(ArtefactRow::into_artefact).collect()
    }
}

fn storage_error(e: sqlx::Error) -> PublicationError {
    PublicationError::Storage(e.to_string())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ArtefactRow {
    id: Uuid,
    source_artefact_id: String,
    provenance: String,
    list_type: String,
    location_id: String,
    kind: String,
    sensitivity: String,
    language: String,
    display_from: DateTime<Utc>,
    display_to: DateTime<Utc>,
    content_date: DateTime<Utc>,
    payload_ref: String,
    search: serde_json::Value,
    last_received_at: DateTime<Utc>,
    superseded_count: i32,
}

impl ArtefactRow {
    fn into_artefact(self) -> Result<Artefact, PublicationError> {
        let search: SearchIndex = serde_json::from_value(self.search)
            .map_err(|e| PublicationError::Storage(format!("search index decode: {e}")))?;
        Ok(Artefact {
            id: ArtefactId::from_uuid(self.id),
            source_artefact_id: SourceArtefactId::new(self.source_artefact_id)?,
            provenance: Provenance::new(self.provenance)?,
            list_type: self.list_type.parse::<ListType>()?,
            location_id: LocationId::new(self.location_id)?,
            kind: self.kind.parse::<ArtefactKind>()?,
            sensitivity: self.sensitivity.parse::<Sensitivity>()?,
            language: self.language.parse::<Language>()?,
            display_from: self.display_from,
            display_to: self.display_to,
            content_date: self.content_date,
            payload_ref: PayloadDigest::from_hex(self.payload_ref),
            search,
            last_received_at: self.last_received_at,
            superseded_count: self.superseded_count as u32,
        })
    }
}
