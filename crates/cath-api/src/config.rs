//! # Service Configuration
//!
//! All configuration comes from the environment:
//!
//! | Variable                        | Default        | Meaning                                  |
//! |---------------------------------|----------------|------------------------------------------|
//! | `CATH_API_PORT`                 | `8080`         | Listen port                              |
//! | `CATH_API_TOKEN`                | none           | Bearer token; auth disabled when absent  |
//! | `CATH_ACCOUNT_BASE_URL`         | none           | Account collaborator base URL            |
//! | `CATH_ACCOUNT_TOKEN`            | none           | Bearer token for the account collaborator|
//! | `CATH_MAX_SECONDARY_FILE_BYTES` | `2097152`      | Secondary-file size-guard threshold      |
//! | `CATH_METRICS_ENABLED`          | `true`         | Prometheus middleware and `/metrics`     |
//! | `DATABASE_URL`                  | none           | Postgres; in-memory mode when absent     |

/// Default secondary-file threshold: 2 MiB.
const DEFAULT_MAX_SECONDARY_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Runtime configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Bearer token required on API routes. `None` disables auth
    /// (development and tests only).
    pub auth_token: Option<String>,
    /// Account collaborator base URL. `None` means no external account
    /// service: requester identities never resolve, so gated reads and
    /// all writes are denied.
    pub account_base_url: Option<String>,
    /// Bearer token for the account collaborator.
    pub account_token: Option<String>,
    /// Payloads larger than this persist normally but skip
    /// secondary-file generation.
    pub max_secondary_file_bytes: u64,
    /// Mounts the Prometheus middleware and `/metrics` when true.
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("CATH_API_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let max_secondary_file_bytes = std::env::var("CATH_MAX_SECONDARY_FILE_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_SECONDARY_FILE_BYTES);
        // Anything other than a literal "false" keeps metrics on.
        let metrics_enabled = std::env::var("CATH_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);
        Self {
            port,
            auth_token: std::env::var("CATH_API_TOKEN").ok(),
            account_base_url: std::env::var("CATH_ACCOUNT_BASE_URL").ok(),
            account_token: std::env::var("CATH_ACCOUNT_TOKEN").ok(),
            max_secondary_file_bytes,
            metrics_enabled,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            account_base_url: None,
            account_token: None,
            max_secondary_file_bytes: DEFAULT_MAX_SECONDARY_FILE_BYTES,
            metrics_enabled: true,
        }
    }
}
