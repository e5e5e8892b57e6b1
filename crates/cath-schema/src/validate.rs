//! # Document Validation
//!
//! Walks a parsed listing document against the schema definition for its
//! declared list type, then applies the content-safety rule to every
//! string leaf.
//!
//! ## Determinism
//!
//! Required paths are checked in definition order and the walker descends
//! arrays front to back, so the first reported violation is stable for a
//! given document. When several required fields are missing at once, which
//! one is reported is a property of that traversal order, not a contract.
//!
//! ## Vacuous satisfaction
//!
//! A wildcard over an empty array satisfies everything nested beneath it:
//! no hearings means no requirement to have case numbers.

use serde_json::Value;

use cath_core::{ListType, PublicationError};

use crate::path::{PathSegment, RequiredPath};
use crate::registry::SchemaRegistry;

/// Structural and content-safety validator.
///
/// Pure: no I/O, no retries. A violation is fatal to the ingestion
/// attempt and is never repaired.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    registry: &'static SchemaRegistry,
}

impl Validator {
    /// A validator over the process-wide standard registry.
    pub fn standard() -> Self {
        Self {
            registry: SchemaRegistry::shared(),
        }
    }

    /// Validate a document against the schema for its declared list type.
    ///
    /// # Errors
    ///
    /// - [`PublicationError::UnknownListType`] when the list type has no
    ///   registered definition.
    /// - [`PublicationError::SchemaValidation`] naming the first required
    ///   path the document fails to satisfy.
    /// - [`PublicationError::ContentSafety`] naming the first string leaf
    ///   containing a non-empty angle-bracket pair.
    pub fn validate(&self, document: &Value, list_type: ListType) -> Result<(), PublicationError> {
        let definition = self.registry.definition(list_type)?;

        for path in definition.required_paths() {
            check_required(document, path)?;
        }

        check_content_safety(document, String::new())
    }
}

/// Check one required path against the document root.
fn check_required(document: &Value, path: &RequiredPath) -> Result<(), PublicationError> {
    walk(document, path, path.segments())
}

fn walk(
    value: &Value,
    path: &RequiredPath,
    remaining: &[PathSegment],
) -> Result<(), PublicationError> {
    let Some((segment, rest)) = remaining.split_first() else {
        // The full path resolved to a present value. `null` does not count
        // as present — the source emits absent fields, never null markers.
        if value.is_null() {
            return Err(missing(path, "required field is null"));
        }
        return Ok(());
    };

    match segment {
        PathSegment::Field(name) => match value.as_object().and_then(|o| o.get(name)) {
            Some(child) => walk(child, path, rest),
            None => Err(missing(path, "required field is missing")),
        },
        PathSegment::AnyElement => {
            let Some(elements) = value.as_array() else {
                return Err(missing(path, "expected an array"));
            };
            // Empty array: nested requirements are vacuously satisfied.
            for element in elements {
                walk(element, path, rest)?;
            }
            Ok(())
        }
    }
}

fn missing(path: &RequiredPath, message: &str) -> PublicationError {
    PublicationError::SchemaValidation {
        path: path.as_str().to_string(),
        message: message.to_string(),
    }
}

/// Depth-first scan of every string leaf for a non-empty angle-bracket
/// pair. Reports the concrete dotted path (with array indices) of the
/// first offending leaf, front to back.
fn check_content_safety(value: &Value, path: String) -> Result<(), PublicationError> {
    match value {
        Value::String(s) => {
            if contains_markup(s) {
                Err(PublicationError::ContentSafety { path })
            } else {
                Ok(())
            }
        }
        Value::Array(elements) => {
            for (index, element) in elements.iter().enumerate() {
                check_content_safety(element, join(&path, &index.to_string()))?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, child) in map {
                check_content_safety(child, join(&path, key))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

/// Whether a string contains `<`, then one or more non-`>` characters,
/// then `>`. Equivalent to matching `<[^>]+>`. A lone `<` or `>`, or an
/// empty pair `<>`, passes.
fn contains_markup(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut open: Option<usize> = None;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            // Keep the earliest unclosed `<`: a later `<` before the next
            // `>` is itself non-`>` content and must count toward the pair.
            '<' => {
                if open.is_none() {
                    open = Some(i);
                }
            }
            '>' => {
                if let Some(start) = open {
                    if i > start + 1 {
                        return true;
                    }
                }
                open = None;
            }
            _ => {}
        }
    }
    false
}
