//! # Access Evaluation
//!
//! Decides read and write permission from the requester's role and the
//! artefact's sensitivity crossed with its list type.
//!
//! ## Model
//!
//! - Writes are role-gated only: a small closed set of administrative
//!   roles may ingest. The check runs before validation so rejected
//!   callers never pay validation cost.
//! - Reads branch on sensitivity: PUBLIC is always permitted; everything
//!   above requires a resolved identity plus a verdict from the account
//!   service. Trusted system callers bypass sensitivity checks on reads
//!   but never bypass role checks on writes.
//! - Decisions are never cached here; every read re-evaluates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cath_core::{Artefact, ListType, PublicationError, RequesterId, Sensitivity};

use crate::ports::AccountService;

/// Closed set of requester roles known to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform operators.
    SystemAdmin,
    /// Courts and tribunals service centre administrators.
    InternalAdminCtsc,
    /// Local court administrators.
    InternalAdminLocal,
    /// Cross-team internal super administrators.
    InternalSuperAdmin,
    /// Externally verified account (e.g. accredited press).
    VerifiedThirdParty,
    /// Unverified external account.
    GeneralThirdParty,
}

impl Role {
    /// The canonical wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "SYSTEM_ADMIN",
            Self::InternalAdminCtsc => "INTERNAL_ADMIN_CTSC",
            Self::InternalAdminLocal => "INTERNAL_ADMIN_LOCAL",
            Self::InternalSuperAdmin => "INTERNAL_SUPER_ADMIN",
            Self::VerifiedThirdParty => "VERIFIED_THIRD_PARTY",
            Self::GeneralThirdParty => "GENERAL_THIRD_PARTY",
        }
    }

    /// Whether this role belongs to the closed administrative set that
    /// may ingest and delete artefacts.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::SystemAdmin
                | Self::InternalAdminCtsc
                | Self::InternalAdminLocal
                | Self::InternalSuperAdmin
        )
    }
}

impl std::str::FromStr for Role {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SYSTEM_ADMIN" => Ok(Self::SystemAdmin),
            "INTERNAL_ADMIN_CTSC" => Ok(Self::InternalAdminCtsc),
            "INTERNAL_ADMIN_LOCAL" => Ok(Self::InternalAdminLocal),
            "INTERNAL_SUPER_ADMIN" => Ok(Self::InternalSuperAdmin),
            "VERIFIED_THIRD_PARTY" => Ok(Self::VerifiedThirdParty),
            "GENERAL_THIRD_PARTY" => Ok(Self::GeneralThirdParty),
            other => Err(PublicationError::InvalidIdentifier {
                field: "role",
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who is making a request. Built by the API layer from headers plus an
/// identity lookup; the core only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterContext {
    /// Resolved requester id, absent for unauthenticated callers.
    pub requester_id: Option<RequesterId>,
    /// Role reported by the account service for the resolved identity.
    pub role: Option<Role>,
    /// Trusted internal caller flag. Bypasses read sensitivity gating,
    /// never write role gating.
    pub system: bool,
}

impl RequesterContext {
    /// An unauthenticated (public) caller.
    pub fn unauthenticated() -> Self {
        Self {
            requester_id: None,
            role: None,
            system: false,
        }
    }

    /// A resolved external or internal account.
    pub fn account(requester_id: RequesterId, role: Role) -> Self {
        Self {
            requester_id: Some(requester_id),
            role: Some(role),
            system: false,
        }
    }

    /// A trusted internal system caller.
    pub fn system(requester_id: RequesterId, role: Role) -> Self {
        Self {
            requester_id: Some(requester_id),
            role: Some(role),
            system: true,
        }
    }
}

/// Read/write permission evaluator.
pub struct AccessEvaluator {
    accounts: Arc<dyn AccountService>,
}

impl AccessEvaluator {
    /// Create an evaluator over the account service collaborator.
    pub fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self { accounts }
    }

    /// Whether the requester may ingest or delete artefacts of this list
    /// type. Role-gated only, checked before validation runs.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::Forbidden`] for non-administrative
    /// roles and for callers with no role at all.
    pub fn can_write(
        &self,
        ctx: &RequesterContext,
        list_type: ListType,
    ) -> Result<(), PublicationError> {
        match ctx.role {
            Some(role) if role.is_admin() => Ok(()),
            Some(role) => Err(PublicationError::Forbidden(format!(
                "role {role} may not publish {list_type} artefacts"
            ))),
            None => Err(PublicationError::Forbidden(
                "publishing requires an administrative role".to_string(),
            )),
        }
    }

    /// Whether the requester may run maintenance deletions (by id,
    /// expiry sweep, location purge). Role-gated the same way writes are.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::Forbidden`] for non-administrative
    /// callers.
    pub fn can_administer(&self, ctx: &RequesterContext) -> Result<(), PublicationError> {
        match ctx.role {
            Some(role) if role.is_admin() => Ok(()),
            _ => Err(PublicationError::Forbidden(
                "maintenance operations require an administrative role".to_string(),
            )),
        }
    }

    /// Whether the requester may read the artefact.
    ///
    /// PUBLIC artefacts are always readable, regardless of account
    /// service availability. Gated tiers require a resolved identity and
    /// the collaborator's verdict for (requester, list type, sensitivity).
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::Unauthorized`] when a gated tier is
    /// requested without an identity. Collaborator failures propagate.
    pub async fn can_read(
        &self,
        ctx: &RequesterContext,
        artefact: &Artefact,
    ) -> Result<bool, PublicationError> {
        if artefact.sensitivity == Sensitivity::Public {
            return Ok(true);
        }
        if ctx.system {
            return Ok(true);
        }
        let Some(requester_id) = &ctx.requester_id else {
            return Err(PublicationError::Unauthorized(format!(
                "{} artefacts require an authenticated requester",
                artefact.sensitivity
            )));
        };
        self.accounts
            .is_authorised(requester_id, artefact.list_type, artefact.sensitivity)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticAccountService;
    use cath_core::{
        ArtefactKind, Language, LocationId, PayloadDigest, Provenance, SearchIndex,
        SourceArtefactId,
    };
    use chrono::Utc;

    fn artefact(sensitivity: Sensitivity) -> Artefact {
        Artefact {
            id: cath_core::ArtefactId::new(),
            source_artefact_id: SourceArtefactId::new("src").unwrap(),
            provenance: Provenance::new("LISTING_SERVICE").unwrap(),
            list_type: ListType::CrownDailyList,
            location_id: LocationId::new("9001").unwrap(),
            kind: ArtefactKind::List,
            sensitivity,
            language: Language::English,
            display_from: Utc::now(),
            display_to: Utc::now(),
            content_date: Utc::now(),
            payload_ref: PayloadDigest::of(b"{}"),
            search: SearchIndex::default(),
            last_received_at: Utc::now(),
            superseded_count: 0,
        }
    }

    fn evaluator(accounts: StaticAccountService) -> AccessEvaluator {
        AccessEvaluator::new(Arc::new(accounts))
    }

    #[tokio::test]
    async fn public_reads_never_consult_the_account_service() {
        // A service that fails every call proves PUBLIC short-circuits.
        let eval = evaluator(StaticAccountService::unavailable());
        let ok = eval
            .can_read(&RequesterContext::unauthenticated(), &artefact(Sensitivity::Public))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn gated_read_without_identity_is_unauthorized() {
        let eval = evaluator(StaticAccountService::default());
        for tier in [Sensitivity::Private, Sensitivity::Classified, Sensitivity::Secret] {
            let err = eval
                .can_read(&RequesterContext::unauthenticated(), &artefact(tier))
                .await
                .unwrap_err();
            assert!(matches!(err, PublicationError::Unauthorized(_)), "{tier}");
        }
    }

    #[tokio::test]
    async fn gated_read_returns_collaborator_verdict() {
        let requester = RequesterId::new("press-account-1").unwrap();
        let accounts = StaticAccountService::default();
        accounts.register(requester.clone(), Role::VerifiedThirdParty);
        accounts.authorise(requester.clone());
        let eval = evaluator(accounts);

        let ctx = RequesterContext::account(requester, Role::VerifiedThirdParty);
        assert!(eval.can_read(&ctx, &artefact(Sensitivity::Classified)).await.unwrap());

        let denied = RequesterId::new("other-account").unwrap();
        let ctx = RequesterContext::account(denied, Role::VerifiedThirdParty);
        assert!(!eval.can_read(&ctx, &artefact(Sensitivity::Classified)).await.unwrap());
    }

    #[tokio::test]
    async fn system_callers_bypass_read_gating_only() {
        let eval = evaluator(StaticAccountService::unavailable());
        let ctx = RequesterContext::system(
            RequesterId::new("ingest-pipeline").unwrap(),
            Role::GeneralThirdParty,
        );
        assert!(eval.can_read(&ctx, &artefact(Sensitivity::Secret)).await.unwrap());
        // Same caller still fails the write role gate.
        assert!(matches!(
            eval.can_write(&ctx, ListType::CrownDailyList),
            Err(PublicationError::Forbidden(_))
        ));
    }

    #[test]
    fn only_admin_roles_may_write() {
        let eval = evaluator(StaticAccountService::default());
        let admin = RequesterContext::account(
            RequesterId::new("ctsc").unwrap(),
            Role::InternalAdminCtsc,
        );
        eval.can_write(&admin, ListType::SjpPublicList).unwrap();

        let press = RequesterContext::account(
            RequesterId::new("press").unwrap(),
            Role::VerifiedThirdParty,
        );
        assert!(eval.can_write(&press, ListType::SjpPublicList).is_err());
        assert!(eval
            .can_write(&RequesterContext::unauthenticated(), ListType::SjpPublicList)
            .is_err());
    }
}
