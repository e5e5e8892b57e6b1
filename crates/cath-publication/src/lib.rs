//! # cath-publication — Ingestion Lifecycle Core
//!
//! The validation-and-lifecycle engine of the publication stack:
//!
//! - [`ports`] — collaborator contracts (storage, blob payloads, accounts)
//!   consumed as `Arc<dyn …>` trait objects so tests substitute in-memory
//!   fakes without a DI container.
//! - [`resolver`] — business-key dedup: find-or-create with a bounded
//!   conflict retry, preserving artefact identity across updates.
//! - [`access`] — read/write gating by role and sensitivity tier.
//! - [`search`] — list-type-aware extraction of flattened lookup keys.
//! - [`service`] — the orchestration state machine tying it together.
//! - [`memory`] — dashmap-backed port implementations for tests and
//!   database-less deployments.
//!
//! ## Crate Policy
//!
//! - No HTTP types leak in here; the API layer maps errors to responses.
//! - The core introduces no threads or timers of its own — all suspension
//!   happens inside collaborator calls awaited by the caller's runtime.

pub mod access;
pub mod memory;
pub mod ports;
pub mod resolver;
pub mod search;
pub mod service;

pub use access::{AccessEvaluator, RequesterContext, Role};
pub use ports::{AccountService, ArtefactStore, BlobStore, IdentityContext};
pub use resolver::{ArtefactDraft, ArtefactResolver, Resolution};
pub use search::SearchExtractor;
pub use service::{ArtefactMetadata, IngestionReceipt, IngestionState, PublicationService};
