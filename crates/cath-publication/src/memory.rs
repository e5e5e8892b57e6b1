//! # In-Memory Port Implementations
//!
//! DashMap-backed implementations of every collaborator port. Used by
//! unit and integration tests, and by the API when no database is
//! configured. Data does not survive a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use cath_core::{
    Artefact, ArtefactId, BusinessKey, ListType, PayloadDigest, PublicationError, RequesterId,
    Sensitivity,
};

use crate::access::Role;
use crate::ports::{AccountService, ArtefactStore, BlobStore, IdentityContext};

// ── Artefact store ───────────────────────────────────────────────────

/// In-memory artefact store. Business-key uniqueness is enforced through
/// a dedicated key index; the entry API keeps find-or-create atomic the
/// same way a unique constraint does in Postgres.
#[derive(Default)]
pub struct InMemoryArtefactStore {
    artefacts: DashMap<ArtefactId, Artefact>,
    by_key: DashMap<BusinessKey, ArtefactId>,
}

impl InMemoryArtefactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live artefacts.
    pub fn len(&self) -> usize {
        self.artefacts.len()
    }

    /// Whether the store holds no artefacts.
    pub fn is_empty(&self) -> bool {
        self.artefacts.is_empty()
    }
}

#[async_trait]
impl ArtefactStore for InMemoryArtefactStore {
    async fn find_by_business_key(
        &self,
        key: &BusinessKey,
    ) -> Result<Option<Artefact>, PublicationError> {
        Ok(self
            .by_key
            .get(key)
            .and_then(|id| self.artefacts.get(&id).map(|a| a.clone())))
    }

    async fn get(&self, id: ArtefactId) -> Result<Option<Artefact>, PublicationError> {
        Ok(self.artefacts.get(&id).map(|a| a.clone()))
    }

    async fn upsert(&self, artefact: Artefact) -> Result<ArtefactId, PublicationError> {
        let key = artefact.business_key();
        let id = artefact.id;

        // Atomic claim of the key slot: first writer wins, later writers
        // with a different id observe the conflict.
        let owner = *self.by_key.entry(key.clone()).or_insert(id);
        if owner != id {
            return Err(PublicationError::BusinessKeyConflict(key.to_string()));
        }
        self.artefacts.insert(id, artefact);
        Ok(id)
    }

    async fn delete_by_id(&self, id: ArtefactId) -> Result<bool, PublicationError> {
        match self.artefacts.remove(&id) {
            Some((_, artefact)) => {
                self.by_key.remove(&artefact.business_key());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, PublicationError> {
        let expired: Vec<ArtefactId> = self
            .artefacts
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.id)
            .collect();
        let mut removed = 0;
        for id in expired {
            if self.delete_by_id(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_by_location_prefix(&self, prefix: &str) -> Result<u64, PublicationError> {
        let matching: Vec<ArtefactId> = self
            .artefacts
            .iter()
            .filter(|entry| entry.location_id.has_prefix(prefix))
            .map(|entry| entry.id)
            .collect();
        let mut removed = 0;
        for id in matching {
            if self.delete_by_id(id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn search_case_id(&self, value: &str) -> Result<Vec<Artefact>, PublicationError> {
        Ok(self
            .artefacts
            .iter()
            .filter(|entry| entry.search.matches_case_id(value))
            .map(|entry| entry.clone())
            .collect())
    }

    async fn search_case_name(&self, fragment: &str) -> Result<Vec<Artefact>, PublicationError> {
        Ok(self
            .artefacts
            .iter()
            .filter(|entry| entry.search.matches_case_name(fragment))
            .map(|entry| entry.clone())
            .collect())
    }
}

// ── Blob store ───────────────────────────────────────────────────────

/// In-memory blob store keyed by content digest. Also records which
/// artefacts had a secondary file requested, so tests can assert the
/// size guard.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: DashMap<PayloadDigest, Vec<u8>>,
    secondary_requests: DashMap<ArtefactId, usize>,
}

impl InMemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many secondary-file requests were made for an artefact.
    pub fn secondary_requests(&self, artefact_id: ArtefactId) -> usize {
        self.secondary_requests
            .get(&artefact_id)
            .map(|count| *count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(&self, bytes: &[u8]) -> Result<PayloadDigest, PublicationError> {
        let digest = PayloadDigest::of(bytes);
        self.blobs.insert(digest.clone(), bytes.to_vec());
        Ok(digest)
    }

    async fn fetch(&self, digest: &PayloadDigest) -> Result<Vec<u8>, PublicationError> {
        self.blobs
            .get(digest)
            .map(|bytes| bytes.clone())
            .ok_or_else(|| PublicationError::Blob(format!("no payload for digest {digest}")))
    }

    async fn request_secondary_file(
        &self,
        artefact_id: ArtefactId,
        _payload: &[u8],
    ) -> Result<(), PublicationError> {
        *self.secondary_requests.entry(artefact_id).or_insert(0) += 1;
        Ok(())
    }
}

// ── Account service ──────────────────────────────────────────────────

/// Configurable account service fake: registered identities plus a set
/// of requesters the collaborator authorises for gated tiers.
#[derive(Default)]
pub struct StaticAccountService {
    identities: DashMap<RequesterId, IdentityContext>,
    authorised: DashMap<RequesterId, ()>,
    unavailable: bool,
}

impl StaticAccountService {
    /// An account service that knows nobody and authorises nobody.
    pub fn new() -> Self {
        Self::default()
    }

    /// An account service whose every call fails with a timeout. Used to
    /// prove PUBLIC reads never depend on collaborator availability.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Register an identity.
    pub fn register(&self, requester_id: RequesterId, role: Role) {
        self.identities.insert(
            requester_id.clone(),
            IdentityContext { requester_id, role },
        );
    }

    /// Mark a requester as authorised for every gated tier.
    pub fn authorise(&self, requester_id: RequesterId) {
        self.authorised.insert(requester_id, ());
    }
}

#[async_trait]
impl AccountService for StaticAccountService {
    async fn resolve_identity(
        &self,
        requester_id: &RequesterId,
    ) -> Result<Option<IdentityContext>, PublicationError> {
        if self.unavailable {
            return Err(PublicationError::CollaboratorTimeout(
                "account service unavailable".to_string(),
            ));
        }
        Ok(self.identities.get(requester_id).map(|i| i.clone()))
    }

    async fn is_authorised(
        &self,
        requester_id: &RequesterId,
        _list_type: ListType,
        _sensitivity: Sensitivity,
    ) -> Result<bool, PublicationError> {
        if self.unavailable {
            return Err(PublicationError::CollaboratorTimeout(
                "account service unavailable".to_string(),
            ));
        }
        Ok(self.authorised.contains_key(requester_id))
    }
}
