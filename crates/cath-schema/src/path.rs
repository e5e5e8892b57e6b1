//! # Required-Field Paths
//!
//! A required path is a dotted traversal through a document tree, e.g.
//! `courtLists.*.courtHouse.courtRoom.*.session.*.sittings.*.hearing.*.case.*.caseNumber`.
//! A `*` segment means "every element of the array at this position".

use cath_core::PublicationError;

/// One step of a required path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Descend into a named object field.
    Field(String),
    /// Apply the remainder of the path to every element of an array.
    /// An empty array satisfies the requirement vacuously.
    AnyElement,
}

/// A parsed required path. Keeps the original dotted form for error
/// reporting — violations name the schema path, not a concrete index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl RequiredPath {
    /// Parse a dotted path. Each segment is a field name or `*`.
    ///
    /// # Errors
    ///
    /// Returns [`PublicationError::InvalidIdentifier`] if the path is
    /// empty or contains an empty segment (`a..b`).
    pub fn parse(raw: &str) -> Result<Self, PublicationError> {
        if raw.is_empty() {
            return Err(PublicationError::InvalidIdentifier {
                field: "requiredPath",
                reason: "must not be empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for segment in raw.split('.') {
            match segment {
                "" => {
                    return Err(PublicationError::InvalidIdentifier {
                        field: "requiredPath",
                        reason: format!("empty segment in '{raw}'"),
                    })
                }
                "*" => segments.push(PathSegment::AnyElement),
                name => segments.push(PathSegment::Field(name.to_string())),
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The original dotted form, as reported in violations.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl std::fmt::Display for RequiredPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_and_wildcards() {
        let path = RequiredPath::parse("courtLists.*.courtHouse.courtHouseName").unwrap();
        assert_eq!(path.segments().len(), 4);
        assert_eq!(path.segments()[1], PathSegment::AnyElement);
        assert_eq!(
            path.segments()[3],
            PathSegment::Field("courtHouseName".to_string())
        );
        assert_eq!(path.as_str(), "courtLists.*.courtHouse.courtHouseName");
    }

    #[test]
    fn rejects_empty_and_degenerate_paths() {
        assert!(RequiredPath::parse("").is_err());
        assert!(RequiredPath::parse("a..b").is_err());
        assert!(RequiredPath::parse(".a").is_err());
    }
}
