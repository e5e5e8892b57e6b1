//! # Publication API
//!
//! Artefact ingestion and lifecycle endpoints. Metadata rides in `x-*`
//! headers; the body is the raw JSON listing document. The contract the
//! upstream listing services publish against:
//!
//! | Header                 | Required | Meaning                               |
//! |------------------------|----------|---------------------------------------|
//! | `x-source-artefact-id` | yes      | Source system's id for the listing    |
//! | `x-provenance`         | yes      | Source system name                    |
//! | `x-list-type`          | yes      | Listing format (schema selector)      |
//! | `x-court-id`           | yes      | Location the listing belongs to       |
//! | `x-type`               | no       | `LIST` (default), `OUTCOME`, …        |
//! | `x-sensitivity`        | no       | Visibility tier, default `PUBLIC`     |
//! | `x-language`           | no       | Default `ENGLISH`                     |
//! | `x-display-from`       | yes      | Visibility window start (RFC 3339)    |
//! | `x-display-to`         | yes      | Visibility window end (RFC 3339)      |
//! | `x-content-date`       | yes      | Date the listing pertains to          |
//! | `x-requester-id`       | no       | Caller identity for role resolution   |

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use cath_core::{
    Artefact, ArtefactId, ArtefactKind, BusinessKey, Language, ListType, LocationId, Provenance,
    Sensitivity, SourceArtefactId,
};
use cath_publication::ArtefactMetadata;

use crate::auth::requester_context;
use crate::error::AppError;
use crate::state::AppState;

/// Ingestion outcome returned to the uploader.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    #[schema(value_type = uuid::Uuid)]
    pub artefact_id: ArtefactId,
    pub is_new: bool,
    pub state: String,
    pub secondary_file_skipped: bool,
}

/// Bulk delete outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub removed: u64,
}

/// Build the publication router.
///
/// The ingest route carries its own body limit: full daily lists run
/// well past the 2 MiB default that covers the rest of the surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/publication",
            put(ingest).layer(axum::extract::DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route(
            "/publication/expired",
            axum::routing::delete(delete_expired),
        )
        .route(
            "/publication/location/:prefix",
            axum::routing::delete(delete_by_location),
        )
        .route(
            "/publication/:id",
            get(get_artefact).delete(delete_artefact),
        )
        .route("/publication/:id/payload", get(get_payload))
}

/// PUT /publication — ingest one artefact.
#[utoipa::path(
    put,
    path = "/publication",
    request_body = String,
    responses(
        (status = 201, description = "New artefact created", body = IngestResponse),
        (status = 200, description = "Existing artefact updated", body = IngestResponse),
        (status = 400, description = "Header or validation failure", body = crate::error::ErrorBody),
        (status = 403, description = "Caller may not publish", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let metadata = parse_metadata(&headers)?;

    let receipt = state.service.ingest(&ctx, metadata, &body).await?;

    let status = if receipt.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(IngestResponse {
            artefact_id: receipt.artefact_id,
            is_new: receipt.is_new,
            state: receipt.state.as_str().to_string(),
            secondary_file_skipped: receipt.secondary_file_skipped,
        }),
    ))
}

/// GET /publication/:id — fetch artefact metadata.
#[utoipa::path(
    get,
    path = "/publication/{id}",
    params(("id" = uuid::Uuid, Path, description = "Artefact id")),
    responses(
        (status = 200, description = "Artefact metadata"),
        (status = 401, description = "Gated tier, no identity", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown or hidden artefact", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn get_artefact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArtefactId>,
) -> Result<Json<Artefact>, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let artefact = state.service.get_artefact(&ctx, id).await?;
    Ok(Json(artefact))
}

/// GET /publication/:id/payload — fetch the raw listing document.
#[utoipa::path(
    get,
    path = "/publication/{id}/payload",
    params(("id" = uuid::Uuid, Path, description = "Artefact id")),
    responses(
        (status = 200, description = "Raw payload bytes"),
        (status = 404, description = "Unknown or hidden artefact", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn get_payload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArtefactId>,
) -> Result<([(axum::http::HeaderName, &'static str); 1], Bytes), AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let payload = state.service.get_payload(&ctx, id).await?;
    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        Bytes::from(payload),
    ))
}

/// DELETE /publication/:id — remove one artefact.
#[utoipa::path(
    delete,
    path = "/publication/{id}",
    params(("id" = uuid::Uuid, Path, description = "Artefact id")),
    responses(
        (status = 204, description = "Artefact removed"),
        (status = 403, description = "Caller may not delete", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown artefact", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn delete_artefact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArtefactId>,
) -> Result<StatusCode, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    state.service.delete_by_id(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /publication/expired — sweep artefacts past their window.
#[utoipa::path(
    delete,
    path = "/publication/expired",
    responses(
        (status = 200, description = "Sweep complete", body = BulkDeleteResponse),
        (status = 403, description = "Caller may not delete", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn delete_expired(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let removed = state.service.delete_expired(&ctx, Utc::now()).await?;
    Ok(Json(BulkDeleteResponse { removed }))
}

/// DELETE /publication/location/:prefix — purge a location subtree.
#[utoipa::path(
    delete,
    path = "/publication/location/{prefix}",
    params(("prefix" = String, Path, description = "Location id prefix")),
    responses(
        (status = 200, description = "Purge complete", body = BulkDeleteResponse),
        (status = 403, description = "Caller may not delete", body = crate::error::ErrorBody),
    ),
    tag = "publication"
)]
async fn delete_by_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(prefix): Path<String>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let removed = state
        .service
        .delete_by_location_prefix(&ctx, &prefix)
        .await?;
    Ok(Json(BulkDeleteResponse { removed }))
}

// ── Header parsing ───────────────────────────────────────────────────

fn parse_metadata(headers: &HeaderMap) -> Result<ArtefactMetadata, AppError> {
    let source_artefact_id = SourceArtefactId::new(required(headers, "x-source-artefact-id")?)
        .map_err(bad_header)?;
    let provenance = Provenance::new(required(headers, "x-provenance")?).map_err(bad_header)?;
    let list_type: ListType = required(headers, "x-list-type")?
        .parse()
        .map_err(bad_header)?;
    let location_id = LocationId::new(required(headers, "x-court-id")?).map_err(bad_header)?;

    let kind: ArtefactKind = optional(headers, "x-type")?
        .unwrap_or("LIST")
        .parse()
        .map_err(bad_header)?;
    let sensitivity: Sensitivity = optional(headers, "x-sensitivity")?
        .unwrap_or("PUBLIC")
        .parse()
        .map_err(bad_header)?;
    let language: Language = optional(headers, "x-language")?
        .unwrap_or("ENGLISH")
        .parse()
        .map_err(bad_header)?;

    Ok(ArtefactMetadata {
        key: BusinessKey {
            source_artefact_id,
            provenance,
            list_type,
            location_id,
        },
        kind,
        sensitivity,
        language,
        display_from: timestamp(headers, "x-display-from")?,
        display_to: timestamp(headers, "x-display-to")?,
        content_date: timestamp(headers, "x-content-date")?,
    })
}

fn required<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    optional(headers, name)?
        .ok_or_else(|| AppError::BadRequest(format!("{name}: header is required")))
}

fn optional<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AppError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::BadRequest(format!("{name}: not valid UTF-8")))
        })
        .transpose()
}

fn timestamp(headers: &HeaderMap, name: &str) -> Result<DateTime<Utc>, AppError> {
    required(headers, name)?
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{name}: not a valid RFC 3339 timestamp")))
}

fn bad_header(err: cath_core::PublicationError) -> AppError {
    AppError::BadRequest(err.to_string())
}
