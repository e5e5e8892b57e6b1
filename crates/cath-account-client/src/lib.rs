//! # cath-account-client — Account Collaborator HTTP Client
//!
//! Typed `reqwest` client for the external account and authorisation
//! service. Implements the publication core's [`AccountService`] port:
//!
//! - identity resolution (`GET /account/{requesterId}`)
//! - read-authorisation verdicts
//!   (`GET /account/{requesterId}/authorised?listType=…&sensitivity=…`)
//!
//! Transport failures retry with exponential backoff; non-2xx responses
//! and decode failures never do. All failures cross the port boundary as
//! collaborator errors, so PUBLIC reads are unaffected by an outage.
//!
//! [`AccountService`]: cath_publication::AccountService

mod client;
mod error;
mod retry;

pub use client::{AccountClientConfig, HttpAccountService};
pub use error::AccountApiError;
