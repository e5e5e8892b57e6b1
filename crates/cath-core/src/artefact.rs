//! # Artefact Entity and Classification Enums
//!
//! The artefact is the central entity of the stack: one ingested court or
//! tribunal listing document plus the metadata that governs its lifecycle
//! and visibility.
//!
//! ## Identity
//!
//! Two identities coexist. The [`ArtefactId`](crate::ArtefactId) is
//! system-generated and stable once assigned. The [`BusinessKey`] — the
//! four-tuple (source artefact id, provenance, list type, location) —
//! identifies "the same logical publication" across repeated uploads and
//! drives dedup: at most one live artefact exists per business key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::PayloadDigest;
use crate::error::PublicationError;
use crate::identity::{ArtefactId, LocationId, Provenance, SourceArtefactId};
use crate::search::SearchIndex;

// ── Sensitivity ──────────────────────────────────────────────────────

/// Ordered read-visibility classification.
///
/// Derive order matters: `Public < Private < Classified < Secret`.
/// Anything above `Public` requires a resolved requester identity and a
/// verdict from the external account service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sensitivity {
    /// Visible to anyone, no identity required.
    Public,
    /// Visible to verified accounts the account service approves.
    Private,
    /// Visible to role-restricted verified accounts.
    Classified,
    /// Highest tier; internal and approved system callers only.
    Secret,
}

impl Sensitivity {
    /// The canonical wire name of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::Classified => "CLASSIFIED",
            Self::Secret => "SECRET",
        }
    }

    /// Whether reads of this tier require a resolved requester identity.
    pub fn requires_identity(&self) -> bool {
        *self > Self::Public
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sensitivity {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE" => Ok(Self::Private),
            "CLASSIFIED" => Ok(Self::Classified),
            "SECRET" => Ok(Self::Secret),
            other => Err(PublicationError::InvalidIdentifier {
                field: "sensitivity",
                reason: format!("unknown sensitivity '{other}'"),
            }),
        }
    }
}

// ── Language ─────────────────────────────────────────────────────────

/// Language of the human-readable rendering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    English,
    Welsh,
    /// Parallel English/Welsh content in one document.
    BiLingual,
}

impl Language {
    /// The canonical wire name of this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "ENGLISH",
            Self::Welsh => "WELSH",
            Self::BiLingual => "BI_LINGUAL",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENGLISH" => Ok(Self::English),
            "WELSH" => Ok(Self::Welsh),
            "BI_LINGUAL" => Ok(Self::BiLingual),
            other => Err(PublicationError::InvalidIdentifier {
                field: "language",
                reason: format!("unknown language '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Artefact kind ────────────────────────────────────────────────────

/// Category of artefact content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtefactKind {
    /// A hearing list (the common case — schema-validated JSON).
    List,
    /// A published outcome document.
    Outcome,
    /// A free-form status update from a court.
    StatusUpdate,
}

impl ArtefactKind {
    /// The canonical wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::Outcome => "OUTCOME",
            Self::StatusUpdate => "STATUS_UPDATE",
        }
    }
}

impl std::str::FromStr for ArtefactKind {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIST" => Ok(Self::List),
            "OUTCOME" => Ok(Self::Outcome),
            "STATUS_UPDATE" => Ok(Self::StatusUpdate),
            other => Err(PublicationError::InvalidIdentifier {
                field: "type",
                reason: format!("unknown artefact type '{other}'"),
            }),
        }
    }
}

// ── List type ────────────────────────────────────────────────────────

/// The specific listing format of a publication. Determines which
/// structural schema applies at ingestion and which extraction rules
/// produce the search index.
///
/// No wildcard matches are used on this enum anywhere in the workspace,
/// so adding a variant forces every list-type-dependent table to be
/// revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListType {
    SjpPublicList,
    SjpPressList,
    CivilDailyCauseList,
    FamilyDailyCauseList,
    CivilAndFamilyDailyCauseList,
    CrownDailyList,
    CrownFirmList,
    CrownWarnedList,
    MagistratesPublicList,
    MagistratesStandardList,
    CopDailyCauseList,
    SscsDailyList,
}

impl ListType {
    /// The canonical wire name of this list type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SjpPublicList => "SJP_PUBLIC_LIST",
            Self::SjpPressList => "SJP_PRESS_LIST",
            Self::CivilDailyCauseList => "CIVIL_DAILY_CAUSE_LIST",
            Self::FamilyDailyCauseList => "FAMILY_DAILY_CAUSE_LIST",
            Self::CivilAndFamilyDailyCauseList => "CIVIL_AND_FAMILY_DAILY_CAUSE_LIST",
            Self::CrownDailyList => "CROWN_DAILY_LIST",
            Self::CrownFirmList => "CROWN_FIRM_LIST",
            Self::CrownWarnedList => "CROWN_WARNED_LIST",
            Self::MagistratesPublicList => "MAGISTRATES_PUBLIC_LIST",
            Self::MagistratesStandardList => "MAGISTRATES_STANDARD_LIST",
            Self::CopDailyCauseList => "COP_DAILY_CAUSE_LIST",
            Self::SscsDailyList => "SSCS_DAILY_LIST",
        }
    }

    /// Whether this list type belongs to the single-justice-procedure
    /// family, whose cases carry a case URN rather than a case number.
    pub fn uses_case_urn(&self) -> bool {
        matches!(self, Self::SjpPublicList | Self::SjpPressList)
    }

    /// Every known list type, in declaration order. Used to build the
    /// schema registry and by table-driven tests.
    pub fn all() -> &'static [ListType] {
        &[
            Self::SjpPublicList,
            Self::SjpPressList,
            Self::CivilDailyCauseList,
            Self::FamilyDailyCauseList,
            Self::CivilAndFamilyDailyCauseList,
            Self::CrownDailyList,
            Self::CrownFirmList,
            Self::CrownWarnedList,
            Self::MagistratesPublicList,
            Self::MagistratesStandardList,
            Self::CopDailyCauseList,
            Self::SscsDailyList,
        ]
    }
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ListType {
    type Err = PublicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListType::all()
            .iter()
            .find(|lt| lt.as_str() == s)
            .copied()
            .ok_or_else(|| PublicationError::UnknownListType(s.to_string()))
    }
}

// ── Business key ─────────────────────────────────────────────────────

/// The four-tuple identifying "the same logical publication" across
/// repeated uploads. At most one live artefact exists per business key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessKey {
    pub source_artefact_id: SourceArtefactId,
    pub provenance: Provenance,
    pub list_type: ListType,
    pub location_id: LocationId,
}

impl std::fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.source_artefact_id, self.provenance, self.list_type, self.location_id
        )
    }
}

// ── Artefact ─────────────────────────────────────────────────────────

/// One ingested listing document plus its lifecycle metadata.
///
/// Mutable fields (temporal window, sensitivity, language, payload
/// reference, search index) are replaced wholesale on every re-ingestion
/// of the same business key; `id` never changes across such updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artefact {
    /// System identity — stable once assigned.
    pub id: ArtefactId,
    /// Business key components.
    pub source_artefact_id: SourceArtefactId,
    pub provenance: Provenance,
    pub list_type: ListType,
    pub location_id: LocationId,
    /// Content category.
    pub kind: ArtefactKind,
    /// Read-visibility tier.
    pub sensitivity: Sensitivity,
    pub language: Language,
    /// Start of the visibility window.
    pub display_from: DateTime<Utc>,
    /// End of the visibility window. Not required to be ≥ `display_from`;
    /// the upstream source records both independently.
    pub display_to: DateTime<Utc>,
    /// The date the underlying listing pertains to.
    pub content_date: DateTime<Utc>,
    /// Content digest of the raw payload held by the blob collaborator.
    pub payload_ref: PayloadDigest,
    /// Flattened lookup keys extracted from the validated document.
    pub search: SearchIndex,
    /// When the most recent ingestion for this business key arrived.
    pub last_received_at: DateTime<Utc>,
    /// How many earlier versions this artefact has replaced in place.
    pub superseded_count: u32,
}

impl Artefact {
    /// The business key of this artefact.
    pub fn business_key(&self) -> BusinessKey {
        BusinessKey {
            source_artefact_id: self.source_artefact_id.clone(),
            provenance: self.provenance.clone(),
            list_type: self.list_type,
            location_id: self.location_id.clone(),
        }
    }

    /// Whether the visibility window has ended: `display_to` strictly
    /// before `now`. Drives the bulk expiry sweep.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.display_to < now
    }
}
