//! Session state for GSTMate.
//!
//! One [`SessionStore`] owns the three per-session maps (business profiles,
//! uploaded-document text, conversation histories) plus the per-session
//! locks that serialize mutating operations. It is constructed once at
//! startup and shared via `Arc` — there is no ambient global state.

pub mod store;

pub use store::SessionStore;
