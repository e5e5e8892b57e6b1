//! # Search Extraction
//!
//! Walks a validated listing document and flattens every case occurrence
//! into lookup keys. The extractor assumes the validator already ran:
//! it tolerates missing branches (an empty list is a valid list) but
//! never re-checks required-field presence.

use serde_json::Value;

use cath_core::{CasePosition, ListType, SearchEntry, SearchIndex, SearchTermKind};

/// Derives the flat [`SearchIndex`] for one document.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchExtractor;

impl SearchExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract lookup keys from a validated document. Case identifiers
    /// come from `caseUrn` for the single-justice-procedure family and
    /// `caseNumber` everywhere else; `caseName` is recorded whenever
    /// present. Occurrences of the same term aggregate their positions
    /// into one entry.
    pub fn extract(&self, document: &Value, list_type: ListType) -> SearchIndex {
        let id_field = if list_type.uses_case_urn() {
            "caseUrn"
        } else {
            "caseNumber"
        };
        let id_kind = if list_type.uses_case_urn() {
            SearchTermKind::CaseUrn
        } else {
            SearchTermKind::CaseNumber
        };

        let mut entries: Vec<SearchEntry> = Vec::new();
        for (court_list_idx, court_list) in array(&document["courtLists"]).iter().enumerate() {
            // Hearings are numbered in document order across every room,
            // session and sitting of one court list, so a position can be
            // replayed against the rendered list.
            let mut hearing_idx = 0;
            for room in array(&court_list["courtHouse"]["courtRoom"]) {
                for session in array(&room["session"]) {
                    for sitting in array(&session["sittings"]) {
                        for hearing in array(&sitting["hearing"]) {
                            for (case_idx, case) in array(&hearing["case"]).iter().enumerate() {
                                let position = CasePosition {
                                    court_list: court_list_idx,
                                    hearing: hearing_idx,
                                    case: case_idx,
                                };
                                if let Some(term) = text(&case[id_field]) {
                                    record(&mut entries, id_kind, term, position);
                                }
                                if let Some(name) = text(&case["caseName"]) {
                                    record(
                                        &mut entries,
                                        SearchTermKind::CaseName,
                                        name,
                                        position,
                                    );
                                }
                            }
                            hearing_idx += 1;
                        }
                    }
                }
            }
        }
        SearchIndex::new(entries)
    }
}

fn array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn record(entries: &mut Vec<SearchEntry>, kind: SearchTermKind, term: &str, position: CasePosition) {
    if let Some(existing) = entries.iter_mut().find(|e| e.kind == kind && e.term == term) {
        existing.positions.push(position);
        return;
    }
    entries.push(SearchEntry {
        kind,
        term: term.to_string(),
        positions: vec![position],
    });
}
