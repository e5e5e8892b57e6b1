//! Account API client error types.

use cath_core::PublicationError;

/// Errors from account collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum AccountApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The account service returned a non-2xx status.
    #[error("account service {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("account client configuration: {0}")]
    Config(String),
}

/// Every client failure crosses the port boundary as a collaborator
/// failure. The core surfaces it without local retry; PUBLIC reads never
/// reach this path.
impl From<AccountApiError> for PublicationError {
    fn from(err: AccountApiError) -> Self {
        PublicationError::CollaboratorTimeout(err.to_string())
    }
}
