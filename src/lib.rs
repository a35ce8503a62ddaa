//! Offline-first sync client for a story-sharing API.
//!
//! The crate keeps a local, durable copy of the remote story collection and
//! serves it whenever the network is unreachable:
//! - [`store`] — sqlite-backed local store (cached stories, pending
//!   submissions, preferences)
//! - [`api`] — typed client for the remote list/get/create endpoints
//! - [`sync`] — the orchestrator deciding per call whether to use the
//!   network, the store, or both
//! - [`net`] — transport abstraction plus a request-level response cache
//!   applied beneath the API client

pub mod api;
pub mod config;
pub mod error;
pub mod net;
pub mod store;
pub mod sync;
