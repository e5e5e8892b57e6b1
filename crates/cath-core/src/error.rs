//! # Error Taxonomy
//!
//! The structured error hierarchy for the publication stack. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Propagation policy
//!
//! - Validation and authorization errors are caller input problems and are
//!   never retried.
//! - [`PublicationError::BusinessKeyConflict`] is transient; the resolver
//!   retries it exactly once before treating the ingestion as an update.
//! - [`PublicationError::CollaboratorTimeout`] is surfaced verbatim; retry
//!   policy belongs to the caller, not this core.
//! - User-visible failures carry the specific offending field path where
//!   applicable, never a generic "invalid input".

use thiserror::Error;

/// Fixed pattern quoted by content-safety violations. Rejects any string
/// containing a non-empty angle-bracket pair; a lone `<` or `>` passes.
pub const CONTENT_SAFETY_PATTERN: &str = r"^(?!(.|\r|\n)*<[^>]+>)(.|\r|\n)*$";

/// Top-level error type for the publication core.
#[derive(Error, Debug)]
pub enum PublicationError {
    /// The declared list type has no registered schema.
    #[error("unknown list type: {0}")]
    UnknownListType(String),

    /// A required field demanded by the list type's schema is absent.
    #[error("{path}: {message}")]
    SchemaValidation {
        /// Dotted path of the first offending required field.
        path: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// A string leaf contains a non-empty angle-bracket pair.
    #[error("{path}: does not match the regex pattern {CONTENT_SAFETY_PATTERN}")]
    ContentSafety {
        /// Dotted path of the offending string field.
        path: String,
    },

    /// An identifier or header value failed construction-time validation.
    #[error("{field}: {reason}")]
    InvalidIdentifier {
        /// Name of the offending field.
        field: &'static str,
        /// Reason the value was rejected.
        reason: String,
    },

    /// The storage port reported a uniqueness violation on the business
    /// key. Transient: retried exactly once inside the resolver.
    #[error("business key conflict: {0}")]
    BusinessKeyConflict(String),

    /// A gated sensitivity tier was requested without a resolved identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requester's role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unknown artefact id or a search with no hits.
    #[error("not found: {0}")]
    NotFound(String),

    /// The rendered document exceeds the secondary-file threshold.
    /// A degraded-success marker, not an ingestion failure.
    #[error("payload too large: {size} bytes exceeds threshold of {threshold}")]
    PayloadTooLarge {
        /// Observed payload size in bytes.
        size: usize,
        /// Configured secondary-file threshold in bytes.
        threshold: usize,
    },

    /// An external collaborator timed out. Surfaced, never swallowed.
    #[error("collaborator timeout: {0}")]
    CollaboratorTimeout(String),

    /// The storage port failed for a reason other than a key conflict.
    #[error("storage error: {0}")]
    Storage(String),

    /// The blob collaborator failed to store or fetch a payload.
    #[error("blob store error: {0}")]
    Blob(String),
}

impl PublicationError {
    /// Whether this error may succeed when retried by the caller.
    /// Only collaborator timeouts qualify; everything else is either a
    /// caller input problem or handled internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CollaboratorTimeout(_))
    }
}
