//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the publication
//! stack. Each identifier is a distinct type — you cannot pass a
//! [`LocationId`] where a [`SourceArtefactId`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`SourceArtefactId`], [`Provenance`],
//! [`LocationId`], [`RequesterId`]) validate at construction time.
//! The UUID-based [`ArtefactId`] is always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PublicationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// System-generated identifier for an ingested artefact. Stable across
/// updates of the same business key — allocated on first ingestion and
/// never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtefactId(Uuid);

impl ArtefactId {
    /// Allocate a new random artefact identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an artefact identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ArtefactId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ArtefactId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArtefactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtefactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// The identifier an upstream source system assigned to a publication.
/// Unique only within a provenance — the business key combines both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceArtefactId(String);

impl_validating_deserialize!(SourceArtefactId);

impl SourceArtefactId {
    /// Create a source artefact identifier, validating it is non-empty
    /// and free of whitespace-only content.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::InvalidIdentifier`] for empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, PublicationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(PublicationError::InvalidIdentifier {
                field: "sourceArtefactId",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self(s))
    }

    /// Access the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceArtefactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The source system a publication arrived from (e.g. `LISTING_SERVICE`,
/// `MANUAL_UPLOAD`, `SPREADSHEET_CONVERSION`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Provenance(String);

impl_validating_deserialize!(Provenance);

impl Provenance {
    /// Create a provenance marker, validating it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::InvalidIdentifier`] for empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, PublicationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(PublicationError::InvalidIdentifier {
                field: "provenance",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self(s))
    }

    /// Access the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference-data identifier of the venue a listing belongs to.
///
/// Location identifiers are numeric strings for matched venues, or carry a
/// `NoMatch` prefix when the upstream source could not be mapped to a known
/// venue. Both forms are valid here; the prefix matters only to the bulk
/// fixture-purge operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocationId(String);

impl_validating_deserialize!(LocationId);

impl LocationId {
    /// Create a location identifier, validating it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::InvalidIdentifier`] for empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, PublicationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(PublicationError::InvalidIdentifier {
                field: "locationId",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self(s))
    }

    /// Access the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this location identifier starts with the given prefix.
    /// Used by the bulk fixture-purge operation.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the account making a request, as resolved by the external
/// account service. Absent for unauthenticated (public) requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequesterId(String);

impl_validating_deserialize!(RequesterId);

impl RequesterId {
    /// Create a requester identifier, validating it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::InvalidIdentifier`] for empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, PublicationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(PublicationError::InvalidIdentifier {
                field: "requesterId",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self(s))
    }

    /// Access the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequesterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artefact_id_is_stable_and_displayable() {
        let id = ArtefactId::new();
        let parsed: ArtefactId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn source_artefact_id_rejects_empty() {
        assert!(SourceArtefactId::new("").is_err());
        assert!(SourceArtefactId::new("   ").is_err());
        assert!(SourceArtefactId::new("listing-2024-07").is_ok());
    }

    #[test]
    fn location_id_prefix_matching() {
        let loc = LocationId::new("NoMatch1234").unwrap();
        assert!(loc.has_prefix("NoMatch"));
        assert!(!loc.has_prefix("9"));
    }

    #[test]
    fn validating_deserialize_rejects_empty_provenance() {
        let result: Result<Provenance, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
        let ok: Provenance = serde_json::from_str("\"LISTING_SERVICE\"").unwrap();
        assert_eq!(ok.as_str(), "LISTING_SERVICE");
    }
}
