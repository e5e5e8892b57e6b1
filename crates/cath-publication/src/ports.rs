//! # Collaborator Ports
//!
//! Contracts for the external collaborators the core depends on. All
//! three are object-safe async traits held behind `Arc<dyn …>` so that
//! production adapters (Postgres, HTTP) and in-memory fakes are
//! interchangeable at construction time.
//!
//! ## Timeouts
//!
//! No port operation may block indefinitely. Adapters carry their own
//! timeout configuration and surface expiry as
//! [`PublicationError::CollaboratorTimeout`] — never as a silent success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cath_core::{
    Artefact, ArtefactId, BusinessKey, ListType, PayloadDigest, PublicationError, RequesterId,
    Sensitivity,
};

use crate::access::Role;

/// Storage port for artefact rows and their search index.
///
/// The single non-negotiable property is that [`upsert`](Self::upsert) is
/// atomic with respect to the business-key unique constraint: two
/// concurrent ingestions of the same key must not both create a row.
#[async_trait]
pub trait ArtefactStore: Send + Sync {
    /// Look up the live artefact for a business key, if any.
    async fn find_by_business_key(
        &self,
        key: &BusinessKey,
    ) -> Result<Option<Artefact>, PublicationError>;

    /// Fetch an artefact by system id.
    async fn get(&self, id: ArtefactId) -> Result<Option<Artefact>, PublicationError>;

    /// Insert or replace an artefact row together with its search index,
    /// atomically, enforcing business-key uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::BusinessKeyConflict`] when the row
    /// carries a new id but another live artefact already owns the key —
    /// the signal the resolver uses to retry resolution once.
    async fn upsert(&self, artefact: Artefact) -> Result<ArtefactId, PublicationError>;

    /// Delete one artefact. Returns whether a row existed.
    async fn delete_by_id(&self, id: ArtefactId) -> Result<bool, PublicationError>;

    /// Delete every artefact whose `display_to` is strictly before `now`.
    /// Returns the number of rows removed.
    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, PublicationError>;

    /// Delete every artefact whose location id starts with `prefix`
    /// (test-fixture cleanup). Returns the number of rows removed.
    async fn delete_by_location_prefix(&self, prefix: &str) -> Result<u64, PublicationError>;

    /// Exact search across case numbers and case URNs.
    async fn search_case_id(&self, value: &str) -> Result<Vec<Artefact>, PublicationError>;

    /// Case-insensitive substring search across case names.
    async fn search_case_name(&self, fragment: &str) -> Result<Vec<Artefact>, PublicationError>;
}

/// Blob payload collaborator. Owns the raw bytes; the core keeps only the
/// digest it hands back and never inspects stored payloads again.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a raw payload, returning its content digest.
    async fn store(&self, bytes: &[u8]) -> Result<PayloadDigest, PublicationError>;

    /// Fetch a payload by digest.
    async fn fetch(&self, digest: &PayloadDigest) -> Result<Vec<u8>, PublicationError>;

    /// Ask the collaborator to render and retain the optional secondary
    /// (human-readable) file for an artefact. Skipped entirely for
    /// payloads above the configured size threshold.
    async fn request_secondary_file(
        &self,
        artefact_id: ArtefactId,
        payload: &[u8],
    ) -> Result<(), PublicationError>;
}

/// Resolved identity of a requester, as reported by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub requester_id: RequesterId,
    pub role: Role,
}

/// Authorization collaborator. The core does not compute authorization
/// rules for gated tiers itself — it invokes this service and enforces
/// "no identity ⇒ deny" locally.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Resolve a requester id to an identity, or `None` when unknown.
    async fn resolve_identity(
        &self,
        requester_id: &RequesterId,
    ) -> Result<Option<IdentityContext>, PublicationError>;

    /// Whether the requester may read artefacts of the given list type
    /// and sensitivity. Only consulted for tiers above PUBLIC.
    async fn is_authorised(
        &self,
        requester_id: &RequesterId,
        list_type: ListType,
        sensitivity: Sensitivity,
    ) -> Result<bool, PublicationError>;
}
