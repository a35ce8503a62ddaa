//! Typed client for the story backend's list/get/create endpoints.

mod client;
mod types;

pub use client::{ApiClient, RemoteApi};
pub use types::{ListFilter, Story, StoryDraft};

use thiserror::Error;

/// Failures at the remote boundary.
///
/// The split between `Transport` and `Server` is load-bearing: the sync
/// layer falls back to cached data (or queues a write) only on `Transport`.
/// A server-reported error is terminal and surfaced verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No usable response: connection, DNS, timeout, or an unreadable body.
  #[error("network unreachable: {0}")]
  Transport(String),

  /// The backend answered with its `{error: true, message}` envelope.
  #[error("{message}")]
  Server { message: String },

  /// The photo file backing a create request could not be read.
  #[error("failed to read photo {path}: {source}")]
  Photo {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl ApiError {
  /// True when falling back to cached data (or the pending queue) applies.
  pub fn is_transport(&self) -> bool {
    matches!(self, ApiError::Transport(_))
  }
}

impl From<crate::net::TransportError> for ApiError {
  fn from(err: crate::net::TransportError) -> Self {
    ApiError::Transport(err.0)
  }
}
