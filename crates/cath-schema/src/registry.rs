//! # Schema Registry
//!
//! One immutable [`SchemaDefinition`] per list type, loaded once at
//! process start. The registry is process-wide data, not a per-request
//! concern — route handlers and the publication service share one
//! instance via [`SchemaRegistry::shared`].

use std::collections::HashMap;
use std::sync::OnceLock;

use cath_core::{ListType, PublicationError};

use crate::path::RequiredPath;

/// The required-field tree for one list type, in definition order.
/// Definition order is significant: the first missing path in this order
/// is the one a violation reports.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    list_type: ListType,
    required: Vec<RequiredPath>,
}

impl SchemaDefinition {
    fn new(list_type: ListType, paths: &[&str]) -> Self {
        let required = paths
            .iter()
            .map(|p| {
                // The path tables below are compile-time constants; a parse
                // failure is a programming error caught by the registry tests.
                RequiredPath::parse(p).unwrap_or_else(|e| {
                    panic!("invalid built-in schema path '{p}': {e}")
                })
            })
            .collect();
        Self { list_type, required }
    }

    /// The list type this definition belongs to.
    pub fn list_type(&self) -> ListType {
        self.list_type
    }

    /// Required paths in definition order.
    pub fn required_paths(&self) -> &[RequiredPath] {
        &self.required
    }
}

/// Maps a list type to its structural schema definition.
#[derive(Debug)]
pub struct SchemaRegistry {
    definitions: HashMap<ListType, SchemaDefinition>,
}

/// Path prefix shared by every list type that nests cases under
/// court rooms, sessions and sittings.
const HEARING_CASE: &str =
    "courtLists.*.courtHouse.courtRoom.*.session.*.sittings.*.hearing.*.case";

impl SchemaRegistry {
    /// Build the standard registry covering every known list type.
    pub fn standard() -> Self {
        let case_number = format!("{HEARING_CASE}.*.caseNumber");
        let case_urn = format!("{HEARING_CASE}.*.caseUrn");
        let sitting_start =
            "courtLists.*.courtHouse.courtRoom.*.session.*.sittings.*.sittingStart";

        let mut definitions = HashMap::new();
        for &list_type in ListType::all() {
            let paths: Vec<&str> = match list_type {
                ListType::SjpPublicList => vec![
                    "document.publicationDate",
                    &case_urn,
                ],
                ListType::SjpPressList => vec![
                    "document.publicationDate",
                    &case_urn,
                    "courtLists.*.courtHouse.courtRoom.*.session.*.sittings.*.hearing.*.party",
                ],
                ListType::CivilDailyCauseList
                | ListType::CivilAndFamilyDailyCauseList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    "courtLists.*.courtHouse.courtHouseName",
                    &case_number,
                ],
                ListType::FamilyDailyCauseList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    "courtLists.*.courtHouse.courtHouseName",
                    sitting_start,
                    &case_number,
                ],
                ListType::CrownDailyList | ListType::CrownFirmList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    sitting_start,
                    &case_number,
                ],
                ListType::CrownWarnedList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    &case_number,
                ],
                ListType::MagistratesPublicList
                | ListType::MagistratesStandardList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    "courtLists.*.courtHouse.courtHouseName",
                    &case_number,
                ],
                ListType::CopDailyCauseList => vec![
                    "document.publicationDate",
                    "venue.venueName",
                    "courtLists.*.courtHouse.courtHouseName",
                    sitting_start,
                    &case_number,
                ],
                ListType::SscsDailyList => vec![
                    "document.publicationDate",
                    "courtLists.*.courtHouse.courtHouseName",
                    &case_number,
                ],
            };
            definitions.insert(list_type, SchemaDefinition::new(list_type, &paths));
        }
        Self { definitions }
    }

    /// The process-wide registry instance, built on first use.
    pub fn shared() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(SchemaRegistry::standard)
    }

    /// Look up the definition for a list type.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::UnknownListType`] if no definition is
    /// registered — the fixed registry covers every `ListType` variant,
    /// so this only fires for registries built by tests.
    pub fn definition(&self, list_type: ListType) -> Result<&SchemaDefinition, PublicationError> {
        self.definitions
            .get(&list_type)
            .ok_or_else(|| PublicationError::UnknownListType(list_type.as_str().to_string()))
    }

    /// Number of registered list types.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_list_type() {
        let registry = SchemaRegistry::standard();
        assert_eq!(registry.len(), ListType::all().len());
        for &lt in ListType::all() {
            let def = registry.definition(lt).unwrap();
            assert!(
                !def.required_paths().is_empty(),
                "{lt} must require at least one path"
            );
            assert_eq!(def.list_type(), lt);
        }
    }

    #[test]
    fn sjp_family_requires_case_urn_not_case_number() {
        let registry = SchemaRegistry::standard();
        for lt in [ListType::SjpPublicList, ListType::SjpPressList] {
            let paths: Vec<&str> = registry
                .definition(lt)
                .unwrap()
                .required_paths()
                .iter()
                .map(|p| p.as_str())
                .collect();
            assert!(paths.iter().any(|p| p.ends_with("caseUrn")), "{lt}");
            assert!(!paths.iter().any(|p| p.ends_with("caseNumber")), "{lt}");
        }
    }

    #[test]
    fn every_built_in_path_parses() {
        // SchemaDefinition::new panics on malformed tables; building the
        // registry is the assertion.
        let registry = SchemaRegistry::standard();
        assert!(!registry.is_empty());
    }

    #[test]
    fn shared_registry_is_a_singleton() {
        let a = SchemaRegistry::shared() as *const _;
        let b = SchemaRegistry::shared() as *const _;
        assert_eq!(a, b);
    }
}
