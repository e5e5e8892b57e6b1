//! # Authentication
//!
//! Two layers:
//!
//! - Bearer-token middleware guarding the API surface. Health probes and
//!   `/metrics` are mounted outside it. When no token is configured the
//!   middleware passes everything through (development and tests).
//! - Requester resolution: the `x-requester-id` header is resolved to an
//!   identity through the account collaborator, producing the
//!   [`RequesterContext`] the core gates on. `x-issuing-system: true`
//!   marks a trusted internal caller and requires a resolved identity.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use cath_core::RequesterId;
use cath_publication::RequesterContext;

use crate::error::AppError;
use crate::state::AppState;

/// Bearer token configuration carried as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// Middleware enforcing `Authorization: Bearer <token>` when a token is
/// configured.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    if let Some(expected) = expected {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            return AppError::Unauthorized("missing or invalid bearer token".to_string())
                .into_response();
        }
    }

    next.run(request).await
}

/// Resolve the requester context from request headers.
///
/// No `x-requester-id` header means an unauthenticated (public) caller.
/// An asserted id that the account collaborator does not know is an
/// authentication failure, not an anonymous fallback.
pub async fn requester_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<RequesterContext, AppError> {
    let Some(raw) = headers.get("x-requester-id") else {
        return Ok(RequesterContext::unauthenticated());
    };
    let raw = raw
        .to_str()
        .map_err(|_| AppError::BadRequest("x-requester-id: not valid UTF-8".to_string()))?;
    let requester_id = RequesterId::new(raw)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let identity = state
        .accounts
        .resolve_identity(&requester_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::Unauthorized(format!("unknown requester {requester_id}"))
        })?;

    let system = headers
        .get("x-issuing-system")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    if system {
        Ok(RequesterContext::system(identity.requester_id, identity.role))
    } else {
        Ok(RequesterContext::account(identity.requester_id, identity.role))
    }
}
