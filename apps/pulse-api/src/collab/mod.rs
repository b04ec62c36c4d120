//! Seams to the main application's internal HTTP APIs.
//!
//! Each seam is a trait with a reqwest-backed implementation and an
//! in-memory implementation used by tests. Every call is a single
//! request/response; nothing here participates in gateway state.

pub mod last_seen;
pub mod notifications;
pub mod profiles;
