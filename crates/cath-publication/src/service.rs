//! # Publication Service — Ingestion Orchestration
//!
//! Drives one ingestion through its lifecycle: write-authorization,
//! schema validation, business-key resolution, search extraction and the
//! atomic persist. Every failure before the persist step leaves no
//! artefact state behind. Read and delete paths are gated here too, so
//! the API layer stays a thin header-to-call translation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use cath_core::{
    Artefact, ArtefactId, ArtefactKind, BusinessKey, Language, PublicationError, Sensitivity,
};
use cath_schema::Validator;

use crate::access::{AccessEvaluator, RequesterContext};
use crate::ports::{AccountService, ArtefactStore, BlobStore};
use crate::resolver::{ArtefactDraft, ArtefactResolver};
use crate::search::SearchExtractor;

/// Lifecycle position of one ingestion. `Persisted` and `Rejected` are
/// terminal; the service never retries a rejected ingestion, the caller
/// must resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionState {
    Received,
    Validated,
    Resolved,
    Persisted,
    Rejected,
}

impl IngestionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionState::Received => "RECEIVED",
            IngestionState::Validated => "VALIDATED",
            IngestionState::Resolved => "RESOLVED",
            IngestionState::Persisted => "PERSISTED",
            IngestionState::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for IngestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied metadata for one ingestion, parsed from transport
/// headers before the service is invoked.
#[derive(Debug, Clone)]
pub struct ArtefactMetadata {
    pub key: BusinessKey,
    pub kind: ArtefactKind,
    pub sensitivity: Sensitivity,
    pub language: Language,
    pub display_from: DateTime<Utc>,
    pub display_to: DateTime<Utc>,
    pub content_date: DateTime<Utc>,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReceipt {
    pub artefact_id: ArtefactId,
    /// Whether the business key was previously unknown.
    pub is_new: bool,
    /// Always [`IngestionState::Persisted`] on success.
    pub state: IngestionState,
    /// Set when the payload exceeded the secondary-file threshold and
    /// secondary-file generation was skipped. Degraded success, not an
    /// error.
    pub secondary_file_skipped: bool,
}

/// The orchestration facade over every collaborator port.
pub struct PublicationService {
    store: Arc<dyn ArtefactStore>,
    blobs: Arc<dyn BlobStore>,
    access: AccessEvaluator,
    resolver: ArtefactResolver,
    validator: Validator,
    extractor: SearchExtractor,
    max_secondary_file_bytes: u64,
}

impl PublicationService {
    pub fn new(
        store: Arc<dyn ArtefactStore>,
        blobs: Arc<dyn BlobStore>,
        accounts: Arc<dyn AccountService>,
        max_secondary_file_bytes: u64,
    ) -> Self {
        Self {
            access: AccessEvaluator::new(accounts),
            resolver: ArtefactResolver::new(Arc::clone(&store)),
            validator: Validator::standard(),
            extractor: SearchExtractor::new(),
            store,
            blobs,
            max_secondary_file_bytes,
        }
    }

    /// Ingest one artefact payload.
    ///
    /// Runs the full lifecycle in order: write-authorization check,
    /// payload parse, schema validation, search extraction, blob store,
    /// business-key resolution and atomic persist. The optional
    /// secondary file is requested last and skipped for payloads over
    /// the configured threshold.
    ///
    /// # Errors
    ///
    /// Rejections surface as the error that caused them: `Forbidden`
    /// before validation, `SchemaValidation`/`ContentSafety` during it,
    /// storage and blob errors after.
    pub async fn ingest(
        &self,
        ctx: &RequesterContext,
        metadata: ArtefactMetadata,
        payload: &[u8],
    ) -> Result<IngestionReceipt, PublicationError> {
        let key = metadata.key.clone();
        tracing::debug!(business_key = %key, state = %IngestionState::Received, "ingestion received");

        if let Err(err) = self.access.can_write(ctx, key.list_type) {
            tracing::info!(business_key = %key, state = %IngestionState::Rejected, "write denied");
            return Err(err);
        }

        let document: Value = serde_json::from_slice(payload).map_err(|e| {
            PublicationError::SchemaValidation {
                path: "$".to_string(),
                message: format!("payload is not valid JSON: {e}"),
            }
        })?;
        if let Err(err) = self.validator.validate(&document, key.list_type) {
            tracing::info!(business_key = %key, state = %IngestionState::Rejected, error = %err, "validation failed");
            return Err(err);
        }
        tracing::debug!(business_key = %key, state = %IngestionState::Validated, "schema accepted");

        let search = self.extractor.extract(&document, key.list_type);
        let payload_ref = self.blobs.store(payload).await?;

        let draft = ArtefactDraft {
            key: metadata.key,
            kind: metadata.kind,
            sensitivity: metadata.sensitivity,
            language: metadata.language,
            display_from: metadata.display_from,
            display_to: metadata.display_to,
            content_date: metadata.content_date,
            payload_ref,
            search,
        };
        let now = Utc::now();
        let (artefact, is_new) = self.resolver.commit(draft, now).await?;
        tracing::debug!(
            artefact_id = %artefact.id,
            business_key = %key,
            state = %IngestionState::Resolved,
            is_new,
            "business key resolved"
        );

        let secondary_file_skipped = payload.len() as u64 > self.max_secondary_file_bytes;
        if secondary_file_skipped {
            tracing::warn!(
                artefact_id = %artefact.id,
                size = payload.len(),
                threshold = self.max_secondary_file_bytes,
                "payload over secondary-file threshold, skipping generation"
            );
        } else {
            self.blobs
                .request_secondary_file(artefact.id, payload)
                .await?;
        }

        tracing::info!(
            artefact_id = %artefact.id,
            business_key = %key,
            state = %IngestionState::Persisted,
            is_new,
            "artefact persisted"
        );
        Ok(IngestionReceipt {
            artefact_id: artefact.id,
            is_new,
            state: IngestionState::Persisted,
            secondary_file_skipped,
        })
    }

    /// Fetch an artefact by id, enforcing read gating.
    ///
    /// A denied collaborator verdict for an authenticated requester maps
    /// to `NotFound` so gated artefacts do not leak their existence.
    pub async fn get_artefact(
        &self,
        ctx: &RequesterContext,
        id: ArtefactId,
    ) -> Result<Artefact, PublicationError> {
        let artefact = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| PublicationError::NotFound(format!("no artefact with id {id}")))?;
        if self.access.can_read(ctx, &artefact).await? {
            Ok(artefact)
        } else {
            Err(PublicationError::NotFound(format!(
                "no artefact with id {id}"
            )))
        }
    }

    /// Fetch the raw payload blob behind an artefact, under the same
    /// read gating as the artefact itself.
    pub async fn get_payload(
        &self,
        ctx: &RequesterContext,
        id: ArtefactId,
    ) -> Result<Vec<u8>, PublicationError> {
        let artefact = self.get_artefact(ctx, id).await?;
        self.blobs.fetch(&artefact.payload_ref).await
    }

    /// Exact search by case number or case URN, filtered to artefacts
    /// the requester may read. An empty result is a `NotFound`.
    pub async fn search_case_id(
        &self,
        ctx: &RequesterContext,
        value: &str,
    ) -> Result<Vec<Artefact>, PublicationError> {
        let hits = self.store.search_case_id(value).await?;
        let readable = self.readable(ctx, hits).await?;
        if readable.is_empty() {
            return Err(PublicationError::NotFound(format!(
                "no artefacts for case id {value}"
            )));
        }
        Ok(readable)
    }

    /// Substring search by case name, filtered to artefacts the
    /// requester may read. An empty result is a `NotFound`.
    pub async fn search_case_name(
        &self,
        ctx: &RequesterContext,
        fragment: &str,
    ) -> Result<Vec<Artefact>, PublicationError> {
        let hits = self.store.search_case_name(fragment).await?;
        let readable = self.readable(ctx, hits).await?;
        if readable.is_empty() {
            return Err(PublicationError::NotFound(format!(
                "no artefacts for case name {fragment}"
            )));
        }
        Ok(readable)
    }

    /// Delete one artefact. Administrative roles only.
    pub async fn delete_by_id(
        &self,
        ctx: &RequesterContext,
        id: ArtefactId,
    ) -> Result<(), PublicationError> {
        self.access.can_administer(ctx)?;
        if self.store.delete_by_id(id).await? {
            tracing::info!(artefact_id = %id, "artefact deleted");
            Ok(())
        } else {
            Err(PublicationError::NotFound(format!(
                "no artefact with id {id}"
            )))
        }
    }

    /// Remove every artefact whose display window closed before `now`.
    /// Returns the number removed. Administrative roles only.
    pub async fn delete_expired(
        &self,
        ctx: &RequesterContext,
        now: DateTime<Utc>,
    ) -> Result<u64, PublicationError> {
        self.access.can_administer(ctx)?;
        let removed = self.store.delete_expired_before(now).await?;
        tracing::info!(removed, cutoff = %now, "expiry sweep complete");
        Ok(removed)
    }

    /// Remove every artefact whose location id starts with `prefix`.
    /// Returns the number removed. Administrative roles only.
    pub async fn delete_by_location_prefix(
        &self,
        ctx: &RequesterContext,
        prefix: &str,
    ) -> Result<u64, PublicationError> {
        self.access.can_administer(ctx)?;
        let removed = self.store.delete_by_location_prefix(prefix).await?;
        tracing::info!(removed, prefix, "location purge complete");
        Ok(removed)
    }

    /// Keep only the hits the requester may read. Gated artefacts an
    /// unauthenticated or unapproved requester cannot see are silently
    /// dropped from search results; collaborator failures still surface.
    async fn readable(
        &self,
        ctx: &RequesterContext,
        hits: Vec<Artefact>,
    ) -> Result<Vec<Artefact>, PublicationError> {
        let mut readable = Vec::with_capacity(hits.len());
        for artefact in hits {
            match self.access.can_read(ctx, &artefact).await {
                Ok(true) => readable.push(artefact),
                Ok(false) | Err(PublicationError::Unauthorized(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(readable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::memory::{InMemoryArtefactStore, InMemoryBlobStore, StaticAccountService};
    use cath_core::{ListType, LocationId, Provenance, RequesterId, SourceArtefactId};
    use serde_json::json;

    struct Fixture {
        service: PublicationService,
        blobs: Arc<InMemoryBlobStore>,
        accounts: Arc<StaticAccountService>,
    }

    fn fixture_with_threshold(max_secondary_file_bytes: u64) -> Fixture {
        let store = Arc::new(InMemoryArtefactStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let accounts = Arc::new(StaticAccountService::new());
        let service = PublicationService::new(
            store,
            Arc::clone(&blobs) as Arc<dyn BlobStore>,
            Arc::clone(&accounts) as Arc<dyn AccountService>,
            max_secondary_file_bytes,
        );
        Fixture {
            service,
            blobs,
            accounts,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_threshold(1024 * 1024)
    }

    fn admin() -> RequesterContext {
        RequesterContext::account(
            RequesterId::new("admin-1").unwrap(),
            Role::SystemAdmin,
        )
    }

    fn metadata(sensitivity: Sensitivity, display_to: &str) -> ArtefactMetadata {
        ArtefactMetadata {
            key: BusinessKey {
                source_artefact_id: SourceArtefactId::new("list-2024-07-01").unwrap(),
                provenance: Provenance::new("LISTING_SERVICE").unwrap(),
                list_type: ListType::CrownDailyList,
                location_id: LocationId::new("9001").unwrap(),
            },
            kind: ArtefactKind::List,
            sensitivity,
            language: Language::English,
            display_from: "2024-07-01T00:00:00Z".parse().unwrap(),
            display_to: display_to.parse().unwrap(),
            content_date: "2024-07-01T00:00:00Z".parse().unwrap(),
        }
    }

    fn crown_payload(case_number: &str) -> Vec<u8> {
        json!({
            "document": { "publicationDate": "2024-07-01T09:00:00Z" },
            "venue": { "venueName": "Oxford Combined Court Centre" },
            "courtLists": [{
                "courtHouse": {
                    "courtHouseName": "Oxford Combined Court Centre",
                    "courtRoom": [{
                        "session": [{
                            "sittings": [{
                                "sittingStart": "2024-07-01T10:00:00Z",
                                "hearing": [{
                                    "case": [
                                        { "caseNumber": case_number, "caseName": "Smith v Jones" }
                                    ]
                                }]
                            }]
                        }]
                    }]
                }
            }]
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn upsert_scenario_preserves_identity_and_applies_updates() {
        let fx = fixture();
        let ctx = admin();

        let first = fx
            .service
            .ingest(
                &ctx,
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();
        assert!(first.is_new);
        assert_eq!(first.state, IngestionState::Persisted);

        let second = fx
            .service
            .ingest(
                &ctx,
                metadata(Sensitivity::Private, "2024-07-09T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();
        assert!(!second.is_new);
        assert_eq!(second.artefact_id, first.artefact_id);

        // System reads bypass gating; the stored row reflects the update.
        let system = RequesterContext::system(
            RequesterId::new("pipeline").unwrap(),
            Role::SystemAdmin,
        );
        let stored = fx
            .service
            .get_artefact(&system, first.artefact_id)
            .await
            .unwrap();
        assert_eq!(stored.sensitivity, Sensitivity::Private);
        assert_eq!(
            stored.display_to,
            "2024-07-09T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(stored.superseded_count, 1);
    }

    #[tokio::test]
    async fn non_admin_write_is_rejected_before_validation() {
        let fx = fixture();
        let ctx = RequesterContext::account(
            RequesterId::new("reader").unwrap(),
            Role::VerifiedThirdParty,
        );
        // Deliberately broken payload: the role check must fire first.
        let err = fx
            .service
            .ingest(
                &ctx,
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                b"not json",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::Forbidden(_)));
    }

    #[tokio::test]
    async fn invalid_document_is_rejected_without_partial_state() {
        let fx = fixture();
        let err = fx
            .service
            .ingest(
                &admin(),
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                br#"{"document": {}}"#,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::SchemaValidation { .. }));

        let system = RequesterContext::system(
            RequesterId::new("pipeline").unwrap(),
            Role::SystemAdmin,
        );
        let miss = fx
            .service
            .search_case_name(&system, "smith")
            .await
            .unwrap_err();
        assert!(matches!(miss, PublicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_reflects_the_latest_ingestion_only() {
        let fx = fixture();
        let ctx = admin();

        fx.service
            .ingest(
                &ctx,
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();
        let hits = fx
            .service
            .search_case_id(&RequesterContext::unauthenticated(), "45684548")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // The update replaces the index wholesale; the old case number
        // must stop resolving.
        fx.service
            .ingest(
                &ctx,
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("T20247002"),
            )
            .await
            .unwrap();
        let err = fx
            .service
            .search_case_id(&RequesterContext::unauthenticated(), "45684548")
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::NotFound(_)));
        assert!(fx
            .service
            .search_case_id(&RequesterContext::unauthenticated(), "T20247002")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn gated_artefacts_hide_from_unapproved_readers() {
        let fx = fixture();
        let receipt = fx
            .service
            .ingest(
                &admin(),
                metadata(Sensitivity::Private, "2024-07-09T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();

        // No identity at all: unauthorized, not a silent miss.
        let err = fx
            .service
            .get_artefact(&RequesterContext::unauthenticated(), receipt.artefact_id)
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::Unauthorized(_)));

        // Known identity the collaborator declines: existence is hidden.
        let reader = RequesterId::new("third-party").unwrap();
        fx.accounts
            .register(reader.clone(), Role::VerifiedThirdParty);
        let reader_ctx = RequesterContext::account(reader.clone(), Role::VerifiedThirdParty);
        let err = fx
            .service
            .get_artefact(&reader_ctx, receipt.artefact_id)
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::NotFound(_)));

        // Approved: full read, payload included.
        fx.accounts.authorise(reader);
        let artefact = fx
            .service
            .get_artefact(&reader_ctx, receipt.artefact_id)
            .await
            .unwrap();
        assert_eq!(artefact.sensitivity, Sensitivity::Private);
        let payload = fx
            .service
            .get_payload(&reader_ctx, receipt.artefact_id)
            .await
            .unwrap();
        assert_eq!(payload, crown_payload("45684548"));
    }

    #[tokio::test]
    async fn oversized_payload_persists_but_skips_secondary_file() {
        let fx = fixture_with_threshold(64);
        let payload = crown_payload("45684548");
        assert!(payload.len() > 64);

        let receipt = fx
            .service
            .ingest(
                &admin(),
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &payload,
            )
            .await
            .unwrap();
        assert_eq!(receipt.state, IngestionState::Persisted);
        assert!(receipt.secondary_file_skipped);
        assert_eq!(fx.blobs.secondary_requests(receipt.artefact_id), 0);
    }

    #[tokio::test]
    async fn small_payload_requests_a_secondary_file() {
        let fx = fixture();
        let receipt = fx
            .service
            .ingest(
                &admin(),
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();
        assert!(!receipt.secondary_file_skipped);
        assert_eq!(fx.blobs.secondary_requests(receipt.artefact_id), 1);
    }

    #[tokio::test]
    async fn maintenance_deletes_are_admin_only() {
        let fx = fixture();
        let receipt = fx
            .service
            .ingest(
                &admin(),
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();

        let outsider = RequesterContext::account(
            RequesterId::new("outsider").unwrap(),
            Role::GeneralThirdParty,
        );
        assert!(matches!(
            fx.service
                .delete_by_id(&outsider, receipt.artefact_id)
                .await
                .unwrap_err(),
            PublicationError::Forbidden(_)
        ));

        fx.service
            .delete_by_id(&admin(), receipt.artefact_id)
            .await
            .unwrap();
        assert!(matches!(
            fx.service
                .delete_by_id(&admin(), receipt.artefact_id)
                .await
                .unwrap_err(),
            PublicationError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn expiry_sweep_counts_removed_artefacts() {
        let fx = fixture();
        fx.service
            .ingest(
                &admin(),
                metadata(Sensitivity::Public, "2024-07-02T00:00:00Z"),
                &crown_payload("45684548"),
            )
            .await
            .unwrap();

        let removed = fx
            .service
            .delete_expired(&admin(), "2024-07-05T00:00:00Z".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(removed, 1);
        let removed = fx
            .service
            .delete_expired(&admin(), "2024-07-05T00:00:00Z".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
