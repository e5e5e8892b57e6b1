//! # API Route Modules
//!
//! - `publication` — artefact ingestion (`PUT /publication`), reads by
//!   id, payload retrieval, and maintenance deletes (by id, expiry
//!   sweep, location purge).
//! - `search` — case-id and case-name lookups over extracted search
//!   indexes.

pub mod publication;
pub mod search;
