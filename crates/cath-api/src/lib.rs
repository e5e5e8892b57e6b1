//! # cath-api — Axum API Service for the Publication Stack
//!
//! HTTP surface over the publication service: schema-validated artefact
//! ingestion, sensitivity-gated retrieval, case search, and maintenance
//! deletes. Persistence runs against Postgres when `DATABASE_URL` is set
//! and falls back to in-memory stores otherwise.
//!
//! ## API Surface
//!
//! | Route                                      | Module                   | Domain            |
//! |--------------------------------------------|--------------------------|-------------------|
//! | `PUT /publication`                         | [`routes::publication`]  | Ingestion         |
//! | `GET /publication/:id`                     | [`routes::publication`]  | Metadata read     |
//! | `GET /publication/:id/payload`             | [`routes::publication`]  | Payload read      |
//! | `DELETE /publication/:id`                  | [`routes::publication`]  | Maintenance       |
//! | `DELETE /publication/expired`              | [`routes::publication`]  | Maintenance       |
//! | `DELETE /publication/location/:prefix`     | [`routes::publication`]  | Maintenance       |
//! | `GET /publication/search/case-id/:value`   | [`routes::search`]       | Case search       |
//! | `GET /publication/search/case-name/:value` | [`routes::search`]       | Case search       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the auth
/// middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    // Authenticated API routes.
    //
    // Body size limit: 2 MiB, matching the largest list payload the upstream
    // sources emit. Oversized bodies are rejected with 413 before the handler
    // runs.
    let api = Router::new()
        .merge(routes::publication::router())
        .merge(routes::search::router())
        .merge(openapi::router());

    let mut api = api
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(auth::auth_middleware));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated health probes. Readiness checks actual service health.
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    // Mount /metrics when metrics are enabled (unauthenticated, like health probes).
    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Gathers and encodes all metrics in Prometheus text exposition format.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - Database connection is healthy (when configured).
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
