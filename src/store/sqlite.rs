use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::api::Story;

use super::{schema, StoreError};

/// A story creation captured while the backend was unreachable.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
  pub local_id: i64,
  pub description: String,
  /// Path of the photo file to upload on replay.
  pub photo_ref: String,
  pub lat: Option<f64>,
  pub lon: Option<f64>,
  pub queued_at: DateTime<Utc>,
}

/// The enqueue-side view of a pending submission, before the store assigns
/// its `local_id` and timestamp.
#[derive(Debug, Clone)]
pub struct PendingDraft {
  pub description: String,
  pub photo_ref: String,
  pub lat: Option<f64>,
  pub lon: Option<f64>,
}

/// SQLite-backed local store.
///
/// An explicit instance with an injected path rather than a process-wide
/// singleton, so tests can run isolated stores side by side. Every mutating
/// call has committed before it returns; the caller may treat the store as
/// crash-consistent immediately afterwards.
#[derive(Debug)]
pub struct StoryStore {
  conn: Mutex<Connection>,
}

impl StoryStore {
  /// Open (or create) the store at `path` and run the migration.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
        path: path.display().to_string(),
        source: rusqlite::Error::SqliteFailure(
          rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
          Some(e.to_string()),
        ),
      })?;
    }

    let conn = Connection::open(path).map_err(|e| StoreError::Open {
      path: path.display().to_string(),
      source: e,
    })?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Fresh in-memory store, one per call.
  pub fn in_memory() -> Result<Self, StoreError> {
    let conn = Connection::open_in_memory()?;
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// Idempotent, create-if-absent migration gated on `PRAGMA user_version`.
  /// Refuses to touch a store written by a newer schema.
  fn run_migrations(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;

    let found: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if found > schema::SCHEMA_VERSION {
      return Err(StoreError::SchemaTooNew {
        found,
        supported: schema::SCHEMA_VERSION,
      });
    }

    conn.execute_batch(schema::SCHEMA)?;
    if found < schema::SCHEMA_VERSION {
      conn.pragma_update(None, "user_version", schema::SCHEMA_VERSION)?;
    }

    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.conn.lock().map_err(|_| StoreError::LockPoisoned)
  }

  // --- cached stories -------------------------------------------------

  pub fn all_stories(&self) -> Result<Vec<Story>, StoreError> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare("SELECT data FROM stories ORDER BY cached_at, id")?;

    let stories = stmt
      .query_map([], |row| row.get::<_, Vec<u8>>(0))?
      .collect::<Result<Vec<_>, _>>()?
      .into_iter()
      .map(|data| serde_json::from_slice(&data))
      .collect::<Result<Vec<Story>, _>>()?;

    Ok(stories)
  }

  pub fn story(&self, id: &str) -> Result<Option<Story>, StoreError> {
    let conn = self.lock()?;
    let data: Option<Vec<u8>> = conn
      .query_row("SELECT data FROM stories WHERE id = ?", params![id], |row| {
        row.get(0)
      })
      .optional()?;

    match data {
      Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
      None => Ok(None),
    }
  }

  /// Upsert by id; an existing record is replaced whole, never merged.
  pub fn put_story(&self, story: &Story) -> Result<(), StoreError> {
    let conn = self.lock()?;
    upsert_story(&conn, story)
  }

  /// Upsert a batch in a single transaction: all records commit or none do.
  pub fn put_stories(&self, stories: &[Story]) -> Result<(), StoreError> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    for story in stories {
      upsert_story(&tx, story)?;
    }
    tx.commit()?;
    Ok(())
  }

  /// Idempotent: deleting an absent id is not an error.
  pub fn delete_story(&self, id: &str) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM stories WHERE id = ?", params![id])?;
    Ok(())
  }

  /// Empties the story namespace only; the queue and preferences survive.
  pub fn clear_stories(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM stories", [])?;
    Ok(())
  }

  // --- pending submissions --------------------------------------------

  pub fn enqueue_pending(&self, draft: &PendingDraft) -> Result<PendingSubmission, StoreError> {
    let queued_at = Utc::now();
    let conn = self.lock()?;
    conn.execute(
      "INSERT INTO pending_submissions (description, photo_ref, lat, lon, queued_at)
       VALUES (?, ?, ?, ?, ?)",
      params![
        draft.description,
        draft.photo_ref,
        draft.lat,
        draft.lon,
        queued_at.to_rfc3339(),
      ],
    )?;

    Ok(PendingSubmission {
      local_id: conn.last_insert_rowid(),
      description: draft.description.clone(),
      photo_ref: draft.photo_ref.clone(),
      lat: draft.lat,
      lon: draft.lon,
      queued_at,
    })
  }

  /// The queue in enqueue order.
  pub fn pending_submissions(&self) -> Result<Vec<PendingSubmission>, StoreError> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare(
      "SELECT local_id, description, photo_ref, lat, lon, queued_at
       FROM pending_submissions ORDER BY local_id",
    )?;

    let rows = stmt
      .query_map([], |row| {
        Ok((
          row.get::<_, i64>(0)?,
          row.get::<_, String>(1)?,
          row.get::<_, String>(2)?,
          row.get::<_, Option<f64>>(3)?,
          row.get::<_, Option<f64>>(4)?,
          row.get::<_, String>(5)?,
        ))
      })?
      .collect::<Result<Vec<_>, _>>()?;

    Ok(
      rows
        .into_iter()
        .map(
          |(local_id, description, photo_ref, lat, lon, queued_at)| PendingSubmission {
            local_id,
            description,
            photo_ref,
            lat,
            lon,
            queued_at: parse_timestamp(&queued_at),
          },
        )
        .collect(),
    )
  }

  /// Idempotent: deleting an absent entry is not an error.
  pub fn delete_pending(&self, local_id: i64) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute(
      "DELETE FROM pending_submissions WHERE local_id = ?",
      params![local_id],
    )?;
    Ok(())
  }

  pub fn clear_pending(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM pending_submissions", [])?;
    Ok(())
  }

  /// Remove a replayed queue entry and upsert the story the backend
  /// returned, in one transaction. There is no intermediate state where the
  /// entry is gone but the story missing, or both present.
  pub fn commit_replayed(&self, local_id: i64, story: Option<&Story>) -> Result<(), StoreError> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    tx.execute(
      "DELETE FROM pending_submissions WHERE local_id = ?",
      params![local_id],
    )?;
    if let Some(story) = story {
      upsert_story(&tx, story)?;
    }
    tx.commit()?;
    Ok(())
  }

  // --- preferences ----------------------------------------------------

  pub fn set_preference<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value)?;
    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO preferences (key, value) VALUES (?, ?)",
      params![key, encoded],
    )?;
    Ok(())
  }

  /// An unset key is an absence, not an error.
  pub fn preference<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
    let conn = self.lock()?;
    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM preferences WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;

    match value {
      Some(value) => Ok(Some(serde_json::from_str(&value)?)),
      None => Ok(None),
    }
  }

  pub fn clear_preferences(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM preferences", [])?;
    Ok(())
  }
}

fn upsert_story(conn: &Connection, story: &Story) -> Result<(), StoreError> {
  let data = serde_json::to_vec(story)?;
  conn.execute(
    "INSERT OR REPLACE INTO stories (id, data, created_at, cached_at)
     VALUES (?, ?, ?, datetime('now'))",
    params![story.id, data, story.created_at.to_rfc3339()],
  )?;
  Ok(())
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}
