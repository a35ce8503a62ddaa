//! Failure taxonomy surfaced at the sync boundary.

use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Errors the sync layer reports to its caller.
///
/// Transport failures are consumed inside the orchestrator (they trigger the
/// cache fallback or the pending queue) and only reach the caller when no
/// fallback applies. Every message here is safe to display.
#[derive(Debug, Error)]
pub enum SyncError {
  /// The backend could not be reached and no fallback was possible.
  #[error("network unreachable: {0}")]
  Transport(String),

  /// The backend answered with a business-logic error. Returned verbatim,
  /// never masked by cached data.
  #[error("{message}")]
  Server { message: String },

  /// The local store could not be opened, read, or written.
  #[error("offline storage unavailable: {0}")]
  Storage(#[from] StoreError),

  /// Network unreachable and the local store holds nothing to serve.
  #[error("no cached stories available, check your connection")]
  NoCachedData,

  /// No credential held and nothing cached to show instead.
  #[error("please sign in or register to continue")]
  MissingAuthentication,

  /// The photo file backing a submission could not be read.
  #[error("could not read photo {path}: {reason}")]
  Photo { path: String, reason: String },
}

impl From<ApiError> for SyncError {
  fn from(err: ApiError) -> Self {
    match err {
      ApiError::Transport(reason) => SyncError::Transport(reason),
      ApiError::Server { message } => SyncError::Server { message },
      ApiError::Photo { path, source } => SyncError::Photo {
        path,
        reason: source.to_string(),
      },
    }
  }
}
