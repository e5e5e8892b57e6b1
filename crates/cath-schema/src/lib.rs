//! # cath-schema — Structural Validation for Listing Documents
//!
//! Maps each list type to an immutable schema definition (a required-field
//! tree expressed as dotted paths with array wildcards) and walks parsed
//! documents against it.
//!
//! ## Security Invariant
//!
//! Validation is a trust boundary. Documents that fail structural
//! validation must be rejected with the offending field path; string
//! content containing markup is rejected by the content-safety rule.
//! A caught violation is always fatal to that ingestion attempt and is
//! never silently repaired.
//!
//! ## Design
//!
//! Schema definitions are data, not code: per-list-type conditional
//! branching lives in one table in [`registry`], and the walker in
//! [`validate`] is list-type-agnostic. This keeps validation testable by
//! table-driven cases across the full path set of every list type.

pub mod path;
pub mod registry;
pub mod validate;

pub use path::{PathSegment, RequiredPath};
pub use registry::{SchemaDefinition, SchemaRegistry};
pub use validate::Validator;
