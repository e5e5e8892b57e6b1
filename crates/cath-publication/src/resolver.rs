//! # Artefact Resolution — Business-Key Dedup
//!
//! Decides whether an inbound artefact is a brand-new publication or an
//! update of one already stored, preserving the system identity across
//! updates. The lookup-then-decide sequence races against concurrent
//! ingestions of the same key; the storage port's atomic unique-key
//! upsert is the backstop, and a uniqueness conflict is retried exactly
//! once before being treated as an update.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cath_core::{
    Artefact, ArtefactId, ArtefactKind, BusinessKey, Language, PayloadDigest, PublicationError,
    SearchIndex, Sensitivity,
};

use crate::ports::ArtefactStore;

/// Outcome of resolving a business key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The id the artefact will carry — freshly allocated or inherited.
    pub artefact_id: ArtefactId,
    /// Whether no live artefact owned the key at resolution time.
    pub is_new: bool,
    /// The supersession count the committed artefact will carry: zero
    /// for a fresh key, the predecessor's count plus one for an update.
    pub superseded_count: u32,
}

/// Everything mutable about an inbound artefact, before identity is
/// assigned. The caller replaces all of these wholesale on update —
/// there is no field-level merge.
#[derive(Debug, Clone)]
pub struct ArtefactDraft {
    pub key: BusinessKey,
    pub kind: ArtefactKind,
    pub sensitivity: Sensitivity,
    pub language: Language,
    pub display_from: DateTime<Utc>,
    pub display_to: DateTime<Utc>,
    pub content_date: DateTime<Utc>,
    pub payload_ref: PayloadDigest,
    pub search: SearchIndex,
}

impl ArtefactDraft {
    fn into_artefact(
        self,
        id: ArtefactId,
        superseded_count: u32,
        now: DateTime<Utc>,
    ) -> Artefact {
        Artefact {
            id,
            source_artefact_id: self.key.source_artefact_id,
            provenance: self.key.provenance,
            list_type: self.key.list_type,
            location_id: self.key.location_id,
            kind: self.kind,
            sensitivity: self.sensitivity,
            language: self.language,
            display_from: self.display_from,
            display_to: self.display_to,
            content_date: self.content_date,
            payload_ref: self.payload_ref,
            search: self.search,
            last_received_at: now,
            superseded_count,
        }
    }
}

/// The upsert/dedup engine.
pub struct ArtefactResolver {
    store: Arc<dyn ArtefactStore>,
}

impl ArtefactResolver {
    /// Create a resolver over the storage port.
    pub fn new(store: Arc<dyn ArtefactStore>) -> Self {
        Self { store }
    }

    /// Resolve a business key to an artefact id, allocating a fresh id
    /// when no live artefact owns the key.
    pub async fn resolve(&self, key: &BusinessKey) -> Result<Resolution, PublicationError> {
        match self.store.find_by_business_key(key).await? {
            Some(existing) => Ok(Resolution {
                artefact_id: existing.id,
                is_new: false,
                superseded_count: existing.superseded_count + 1,
            }),
            None => Ok(Resolution {
                artefact_id: ArtefactId::new(),
                is_new: true,
                superseded_count: 0,
            }),
        }
    }

    /// Resolve and persist a draft in one step.
    ///
    /// A [`PublicationError::BusinessKeyConflict`] from the store means a
    /// concurrent ingestion won the insert race; resolution is retried
    /// once — the key now resolves to the winner's id and this ingestion
    /// becomes an in-place update. A second conflict propagates.
    pub async fn commit(
        &self,
        draft: ArtefactDraft,
        now: DateTime<Utc>,
    ) -> Result<(Artefact, bool), PublicationError> {
        let (artefact, is_new) = self.build(draft.clone(), now).await?;
        match self.store.upsert(artefact.clone()).await {
            Ok(_) => Ok((artefact, is_new)),
            Err(PublicationError::BusinessKeyConflict(key)) => {
                tracing::warn!(
                    business_key = %key,
                    "lost business-key insert race, retrying resolution as update"
                );
                let (artefact, is_new) = self.build(draft, now).await?;
                self.store.upsert(artefact.clone()).await?;
                Ok((artefact, is_new))
            }
            Err(other) => Err(other),
        }
    }

    async fn build(
        &self,
        draft: ArtefactDraft,
        now: DateTime<Utc>,
    ) -> Result<(Artefact, bool), PublicationError> {
        let resolution = self.resolve(&draft.key).await?;
        let artefact =
            draft.into_artefact(resolution.artefact_id, resolution.superseded_count, now);
        Ok((artefact, resolution.is_new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryArtefactStore;
    use async_trait::async_trait;
    use cath_core::{LocationId, Provenance, SourceArtefactId};
    use cath_core::ListType;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key(source: &str) -> BusinessKey {
        BusinessKey {
            source_artefact_id: SourceArtefactId::new(source).unwrap(),
            provenance: Provenance::new("LISTING_SERVICE").unwrap(),
            list_type: ListType::CivilDailyCauseList,
            location_id: LocationId::new("9001").unwrap(),
        }
    }

    fn draft(source: &str, sensitivity: Sensitivity) -> ArtefactDraft {
        ArtefactDraft {
            key: key(source),
            kind: ArtefactKind::List,
            sensitivity,
            language: Language::English,
            display_from: Utc::now(),
            display_to: Utc::now(),
            content_date: Utc::now(),
            payload_ref: PayloadDigest::of(b"{}"),
            search: SearchIndex::default(),
        }
    }

    #[tokio::test]
    async fn first_ingestion_allocates_and_second_reuses_the_id() {
        let store = Arc::new(InMemoryArtefactStore::new());
        let resolver = ArtefactResolver::new(store.clone());

        let (first, is_new) = resolver
            .commit(draft("src-1", Sensitivity::Public), Utc::now())
            .await
            .unwrap();
        assert!(is_new);
        assert_eq!(first.superseded_count, 0);

        let (second, is_new) = resolver
            .commit(draft("src-1", Sensitivity::Private), Utc::now())
            .await
            .unwrap();
        assert!(!is_new);
        assert_eq!(second.id, first.id, "artefact id must survive updates");
        assert_eq!(second.sensitivity, Sensitivity::Private);
        assert_eq!(second.superseded_count, 1);

        // Only one live artefact owns the key.
        let found = store.find_by_business_key(&key("src-1")).await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.sensitivity, Sensitivity::Private);
    }

    #[tokio::test]
    async fn resolve_reports_identity_and_successor_count() {
        let store = Arc::new(InMemoryArtefactStore::new());
        let resolver = ArtefactResolver::new(store.clone());

        let fresh = resolver.resolve(&key("src-1")).await.unwrap();
        assert!(fresh.is_new);
        assert_eq!(fresh.superseded_count, 0);

        let (committed, _) = resolver
            .commit(draft("src-1", Sensitivity::Public), Utc::now())
            .await
            .unwrap();

        // Resolution does not persist anything: the committed artefact
        // carries its own id, not the one the dry run allocated.
        assert_ne!(committed.id, fresh.artefact_id);

        let occupied = resolver.resolve(&key("src-1")).await.unwrap();
        assert!(!occupied.is_new);
        assert_eq!(occupied.artefact_id, committed.id);
        assert_eq!(occupied.superseded_count, 1);
    }

    #[tokio::test]
    async fn distinct_keys_resolve_to_distinct_artefacts() {
        let store = Arc::new(InMemoryArtefactStore::new());
        let resolver = ArtefactResolver::new(store);
        let (a, _) = resolver
            .commit(draft("src-a", Sensitivity::Public), Utc::now())
            .await
            .unwrap();
        let (b, _) = resolver
            .commit(draft("src-b", Sensitivity::Public), Utc::now())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    /// Store wrapper that reports a business-key conflict on the first
    /// insert attempt, simulating a lost race against a concurrent
    /// ingestion that committed in between.
    struct RacingStore {
        inner: InMemoryArtefactStore,
        conflicts_remaining: AtomicU32,
        winner_draft: ArtefactDraft,
    }

    #[async_trait]
    impl ArtefactStore for RacingStore {
        async fn find_by_business_key(
            &self,
            key: &BusinessKey,
        ) -> Result<Option<Artefact>, PublicationError> {
            self.inner.find_by_business_key(key).await
        }

        async fn get(&self, id: ArtefactId) -> Result<Option<Artefact>, PublicationError> {
            self.inner.get(id).await
        }

        async fn upsert(&self, artefact: Artefact) -> Result<ArtefactId, PublicationError> {
            if self
                .conflicts_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                // The concurrent winner commits before the conflict is
                // reported, exactly as a unique-constraint violation
                // implies another row now owns the key.
                let won = self
                    .inner
                    .find_by_business_key(&artefact.business_key())
                    .await?;
                if won.is_none() {
                    let winner = self
                        .winner_draft
                        .clone()
                        .into_artefact(ArtefactId::new(), 0, Utc::now());
                    self.inner.upsert(winner).await?;
                }
                return Err(PublicationError::BusinessKeyConflict(
                    artefact.business_key().to_string(),
                ));
            }
            self.inner.upsert(artefact).await
        }

        async fn delete_by_id(&self, id: ArtefactId) -> Result<bool, PublicationError> {
            self.inner.delete_by_id(id).await
        }

        async fn delete_expired_before(
            &self,
            now: DateTime<Utc>,
        ) -> Result<u64, PublicationError> {
            self.inner.delete_expired_before(now).await
        }

        async fn delete_by_location_prefix(
            &self,
            prefix: &str,
        ) -> Result<u64, PublicationError> {
            self.inner.delete_by_location_prefix(prefix).await
        }

        async fn search_case_id(&self, value: &str) -> Result<Vec<Artefact>, PublicationError> {
            self.inner.search_case_id(value).await
        }

        async fn search_case_name(
            &self,
            fragment: &str,
        ) -> Result<Vec<Artefact>, PublicationError> {
            self.inner.search_case_name(fragment).await
        }
    }

    #[tokio::test]
    async fn conflict_is_retried_once_and_becomes_an_update() {
        let store = Arc::new(RacingStore {
            inner: InMemoryArtefactStore::new(),
            conflicts_remaining: AtomicU32::new(1),
            winner_draft: draft("src-raced", Sensitivity::Public),
        });
        let resolver = ArtefactResolver::new(store.clone());

        let (artefact, is_new) = resolver
            .commit(draft("src-raced", Sensitivity::Classified), Utc::now())
            .await
            .unwrap();

        assert!(!is_new, "after losing the race the ingestion is an update");
        assert_eq!(artefact.sensitivity, Sensitivity::Classified);
        assert_eq!(artefact.superseded_count, 1);
        let stored = store
            .find_by_business_key(&key("src-raced"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, artefact.id);
    }

    #[tokio::test]
    async fn second_conflict_propagates() {
        let store = Arc::new(RacingStore {
            inner: InMemoryArtefactStore::new(),
            conflicts_remaining: AtomicU32::new(2),
            winner_draft: draft("src-raced", Sensitivity::Public),
        });
        let resolver = ArtefactResolver::new(store);

        let err = resolver
            .commit(draft("src-raced", Sensitivity::Classified), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::BusinessKeyConflict(_)));
    }
}
