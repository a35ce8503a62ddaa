//! Request-level response cache applied at the transport boundary.
//!
//! [`CachingTransport`] wraps any [`Transport`] and applies a per-request
//! strategy, independent of whatever the sync layer above it decides:
//! - GET requests under the API prefix: network-first, stored copy served
//!   only when the network fails
//! - every other GET (static assets): cache-first
//! - non-GET requests: passed through untouched, never stored
//!
//! Stored responses are keyed by method + URL under a single cache
//! generation; opening the cache with a new generation purges everything
//! stored under previous ones.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("cache database error: {0}")]
  Database(#[from] rusqlite::Error),
  #[error("could not open response cache at {path}: {source}")]
  Open {
    path: String,
    source: rusqlite::Error,
  },
  #[error("cache lock poisoned")]
  LockPoisoned,
}

const RESPONSE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS responses (
    generation TEXT NOT NULL,
    request_key TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    content_type TEXT,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, request_key)
);
"#;

/// Durable store of successful responses, keyed by the full request.
///
/// Lives in its own database file and shares no state with the story store:
/// the two survive each other's corruption or clearing independently.
pub struct ResponseCache {
  conn: Mutex<Connection>,
  generation: String,
}

impl ResponseCache {
  /// Open the cache and activate `generation`: every response stored under
  /// a different generation is purged (a single generation is retained at a
  /// time, no further eviction).
  pub fn open(path: &Path, generation: &str) -> Result<Self, CacheError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| CacheError::Open {
        path: path.display().to_string(),
        source: rusqlite::Error::SqliteFailure(
          rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
          Some(e.to_string()),
        ),
      })?;
    }

    let conn = Connection::open(path).map_err(|e| CacheError::Open {
      path: path.display().to_string(),
      source: e,
    })?;

    let cache = Self {
      conn: Mutex::new(conn),
      generation: generation.to_string(),
    };
    cache.activate()?;

    Ok(cache)
  }

  /// In-memory cache, one per call.
  pub fn in_memory(generation: &str) -> Result<Self, CacheError> {
    let conn = Connection::open_in_memory()?;
    let cache = Self {
      conn: Mutex::new(conn),
      generation: generation.to_string(),
    };
    cache.activate()?;
    Ok(cache)
  }

  fn activate(&self) -> Result<(), CacheError> {
    let conn = self.conn.lock().map_err(|_| CacheError::LockPoisoned)?;
    conn.execute_batch(RESPONSE_SCHEMA)?;

    let purged = conn.execute(
      "DELETE FROM responses WHERE generation != ?",
      params![self.generation],
    )?;
    if purged > 0 {
      debug!(purged, generation = %self.generation, "purged responses from previous cache generations");
    }

    Ok(())
  }

  pub fn store(&self, request: &HttpRequest, response: &HttpResponse) -> Result<(), CacheError> {
    let conn = self.conn.lock().map_err(|_| CacheError::LockPoisoned)?;
    conn.execute(
      "INSERT OR REPLACE INTO responses
         (generation, request_key, method, url, status, content_type, body, stored_at)
       VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'))",
      params![
        self.generation,
        request_key(request),
        request.method.as_str(),
        request.url,
        response.status,
        response.content_type,
        response.body,
      ],
    )?;
    Ok(())
  }

  pub fn lookup(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, CacheError> {
    let conn = self.conn.lock().map_err(|_| CacheError::LockPoisoned)?;
    let row = conn
      .query_row(
        "SELECT status, content_type, body FROM responses
         WHERE generation = ? AND request_key = ?",
        params![self.generation, request_key(request)],
        |row| {
          Ok(HttpResponse {
            status: row.get(0)?,
            content_type: row.get(1)?,
            body: row.get(2)?,
          })
        },
      )
      .optional()?;

    Ok(row)
  }

  #[cfg(test)]
  fn stored_count(&self) -> usize {
    let conn = self.conn.lock().expect("lock");
    conn
      .query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))
      .expect("count")
  }
}

/// Stable fixed-length key for a request: sha256 over method and URL.
fn request_key(request: &HttpRequest) -> String {
  let mut hasher = Sha256::new();
  hasher.update(request.method.as_str().as_bytes());
  hasher.update(b" ");
  hasher.update(request.url.as_bytes());
  hex::encode(hasher.finalize())
}

/// Transport wrapper applying the per-request caching strategy.
pub struct CachingTransport<T: Transport> {
  inner: T,
  cache: ResponseCache,
  /// Requests whose URL starts with this prefix are treated as API calls.
  api_prefix: String,
}

impl<T: Transport> CachingTransport<T> {
  pub fn new(inner: T, cache: ResponseCache, api_prefix: impl Into<String>) -> Self {
    Self {
      inner,
      cache,
      api_prefix: api_prefix.into(),
    }
  }

  /// Record a copy of a successful response. Cache write failures must not
  /// fail the request they piggyback on, so they are logged and dropped.
  fn store_copy(&self, request: &HttpRequest, response: &HttpResponse) {
    if !response.is_success() {
      return;
    }
    if let Err(err) = self.cache.store(request, response) {
      warn!(url = %request.url, error = %err, "failed to store response copy");
    }
  }

  fn stored_copy(&self, request: &HttpRequest) -> Option<HttpResponse> {
    match self.cache.lookup(request) {
      Ok(hit) => hit,
      Err(err) => {
        warn!(url = %request.url, error = %err, "response cache lookup failed");
        None
      }
    }
  }
}

#[async_trait]
impl<T: Transport> Transport for CachingTransport<T> {
  async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    if request.method != Method::Get {
      return self.inner.send(request).await;
    }

    if request.url.starts_with(&self.api_prefix) {
      // API requests: network first, stored copy on failure
      match self.inner.send(request).await {
        Ok(response) => {
          self.store_copy(request, &response);
          Ok(response)
        }
        Err(err) => match self.stored_copy(request) {
          Some(hit) => {
            debug!(url = %request.url, "network failed, serving stored response");
            Ok(hit)
          }
          None => Err(err),
        },
      }
    } else {
      // Everything else: cache first
      if let Some(hit) = self.stored_copy(request) {
        return Ok(hit);
      }
      let response = self.inner.send(request).await?;
      self.store_copy(request, &response);
      Ok(response)
    }
  }
}
