//! # cath-core — Domain Types for the Hearings Publication Stack
//!
//! Foundational types shared by every other crate in the workspace:
//! identity newtypes, the artefact entity and its classification enums,
//! the business key used for dedup, the flattened search index, payload
//! digests, and the error taxonomy.
//!
//! ## Crate Policy
//!
//! - No I/O, no async, no HTTP. Pure data and invariants.
//! - Sits at the bottom of the dependency DAG — depends on nothing internal.
//! - Identifier newtypes validate at construction; an invalid value cannot
//!   be represented once it crosses a constructor.

pub mod artefact;
pub mod digest;
pub mod error;
pub mod identity;
pub mod search;

pub use artefact::{Artefact, ArtefactKind, BusinessKey, Language, ListType, Sensitivity};
pub use digest::PayloadDigest;
pub use error::PublicationError;
pub use identity::{ArtefactId, LocationId, Provenance, RequesterId, SourceArtefactId};
pub use search::{CasePosition, SearchEntry, SearchIndex, SearchTermKind};
