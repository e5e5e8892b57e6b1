//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer token authentication. Set via CATH_API_TOKEN env var.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the publication API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CaTH Publication API",
        description = "Court and tribunal hearing publication service: schema-validated artefact ingestion with business-key dedup, sensitivity-gated reads, case search, and maintenance deletes.\n\nAuthentication: Bearer token via `Authorization: Bearer <token>` header. Health probes (`/health/*`) and `/metrics` are unauthenticated.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::publication::ingest,
        crate::routes::publication::get_artefact,
        crate::routes::publication::get_payload,
        crate::routes::publication::delete_artefact,
        crate::routes::publication::delete_expired,
        crate::routes::publication::delete_by_location,
        crate::routes::search::search_case_id,
        crate::routes::search::search_case_name,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::publication::IngestResponse,
        crate::routes::publication::BulkDeleteResponse,
    )),
    tags(
        (name = "publication", description = "Artefact ingestion and lifecycle"),
        (name = "search", description = "Case search over extracted indexes"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Build the OpenAPI router serving the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
