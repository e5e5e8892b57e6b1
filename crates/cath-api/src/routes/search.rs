//! # Case Search API
//!
//! Lookups over the flattened search indexes extracted at ingestion.
//! Results are filtered to what the requester may read before anything
//! is returned, and an empty result is a 404 — gated artefacts never
//! reveal their existence through search.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use cath_core::Artefact;

use crate::auth::requester_context;
use crate::error::AppError;
use crate::state::AppState;

/// Build the search router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/publication/search/case-id/:value", get(search_case_id))
        .route(
            "/publication/search/case-name/:value",
            get(search_case_name),
        )
}

/// GET /publication/search/case-id/:value — exact case number/URN lookup.
#[utoipa::path(
    get,
    path = "/publication/search/case-id/{value}",
    params(("value" = String, Path, description = "Case number or case URN")),
    responses(
        (status = 200, description = "Matching artefacts"),
        (status = 404, description = "No readable match", body = crate::error::ErrorBody),
    ),
    tag = "search"
)]
async fn search_case_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(value): Path<String>,
) -> Result<Json<Vec<Artefact>>, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let hits = state.service.search_case_id(&ctx, &value).await?;
    Ok(Json(hits))
}

/// GET /publication/search/case-name/:value — substring case-name lookup.
#[utoipa::path(
    get,
    path = "/publication/search/case-name/{value}",
    params(("value" = String, Path, description = "Case name fragment")),
    responses(
        (status = 200, description = "Matching artefacts"),
        (status = 404, description = "No readable match", body = crate::error::ErrorBody),
    ),
    tag = "search"
)]
async fn search_case_name(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(value): Path<String>,
) -> Result<Json<Vec<Artefact>>, AppError> {
    let ctx = requester_context(&state, &headers).await?;
    let hits = state.service.search_case_name(&ctx, &value).await?;
    Ok(Json(hits))
}
