//! # Flattened Search Index
//!
//! Derived lookup keys extracted from a validated listing document.
//! A [`SearchIndex`] is owned by exactly one artefact and is regenerated
//! wholesale on every ingestion — entries from a previous version of the
//! same artefact never survive an update.

use serde::{Deserialize, Serialize};

/// What kind of lookup key a search entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchTermKind {
    /// Exact case-number lookup (most list types).
    CaseNumber,
    /// Exact case-URN lookup (single-justice-procedure family).
    CaseUrn,
    /// Substring case-name lookup.
    CaseName,
}

/// Coordinates of one case occurrence inside the document tree,
/// recorded so a hit can point back at the hearing it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePosition {
    /// Index into `courtLists`.
    pub court_list: usize,
    /// Index of the hearing within the flattened sitting order.
    pub hearing: usize,
    /// Index of the case within the hearing.
    pub case: usize,
}

/// One extracted lookup key and every position it occurred at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub kind: SearchTermKind,
    pub term: String,
    pub positions: Vec<CasePosition>,
}

/// All lookup keys for one artefact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build an index from extracted entries.
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        Self { entries }
    }

    /// All entries, in extraction order.
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Whether the index holds no entries (valid for an empty list).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match on a case identifier — case numbers and case URNs
    /// resolve through the same query shape.
    pub fn matches_case_id(&self, value: &str) -> bool {
        self.entries.iter().any(|e| {
            matches!(e.kind, SearchTermKind::CaseNumber | SearchTermKind::CaseUrn)
                && e.term == value
        })
    }

    /// Case-insensitive substring match on case names.
    pub fn matches_case_name(&self, fragment: &str) -> bool {
        let needle = fragment.to_lowercase();
        self.entries.iter().any(|e| {
            e.kind == SearchTermKind::CaseName && e.term.to_lowercase().contains(&needle)
        })
    }
}
