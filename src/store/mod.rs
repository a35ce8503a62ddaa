//! Durable local store backing offline reads and queued writes.
//!
//! Three independent namespaces, each readable, writable, and clearable on
//! its own: cached stories, the pending-submission queue, and scalar
//! preferences.

pub mod schema;
mod sqlite;

pub use sqlite::{PendingDraft, PendingSubmission, StoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("failed to encode record: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("could not open store at {path}: {source}")]
  Open {
    path: String,
    source: rusqlite::Error,
  },

  #[error("store lock poisoned")]
  LockPoisoned,

  #[error("store schema version {found} is newer than this build supports ({supported})")]
  SchemaTooNew { found: i64, supported: i64 },
}

/// Preference key: when the cached story collection was last refreshed from
/// a successful full-list fetch. Monotonically non-decreasing.
pub const PREF_LAST_SYNC_AT: &str = "last_sync_at";

/// Preference key: last observed connectivity. A hint, not ground truth.
pub const PREF_IS_ONLINE: &str = "is_online";
