//! Store schema and versioning.
//!
//! The version lives in `PRAGMA user_version`. The migration is idempotent
//! (create-if-absent only) and runs once at open; it never drops or rewrites
//! an existing namespace, so a minor version bump cannot lose data.

/// Current schema version, written to `user_version` after migration.
pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA: &str = r#"
-- Cached stories, complete server-shaped records stored as JSON
CREATE TABLE IF NOT EXISTS stories (
    id TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    created_at TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Story creations captured while offline, replayed in enqueue order
CREATE TABLE IF NOT EXISTS pending_submissions (
    local_id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    photo_ref TEXT NOT NULL,
    lat REAL,
    lon REAL,
    queued_at TEXT NOT NULL
);

-- Scalar preferences, JSON-encoded values keyed by string
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
