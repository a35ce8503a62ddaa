//! Wire types for the story backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A story exactly as the backend shapes it. The local store only ever holds
/// complete records of this form, never partial or optimistic ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
  pub id: String,
  pub name: String,
  pub description: String,
  pub photo_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lat: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lon: Option<f64>,
  pub created_at: DateTime<Utc>,
}

/// Filter and pagination parameters for the list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
  pub page: Option<u32>,
  pub size: Option<u32>,
  /// Only stories carrying coordinates (the backend's `location=1` flag).
  pub with_location: Option<bool>,
}

impl ListFilter {
  /// First page at the given size, as used by the post-create refresh.
  pub fn first_page(size: u32) -> Self {
    Self {
      page: Some(1),
      size: Some(size),
      with_location: None,
    }
  }
}

/// A story creation request as captured from the user: the photo stays a
/// file reference so a queued submission can be replayed later.
#[derive(Debug, Clone)]
pub struct StoryDraft {
  pub description: String,
  pub photo_path: PathBuf,
  pub lat: Option<f64>,
  pub lon: Option<f64>,
}

/// Envelope of the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListEnvelope {
  pub error: bool,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub list_story: Vec<Story>,
}

/// Envelope of the detail endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailEnvelope {
  pub error: bool,
  #[serde(default)]
  pub message: String,
  pub story: Option<Story>,
}

/// Envelope of the create endpoints. The backend may acknowledge a create
/// without echoing the stored record back.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateEnvelope {
  pub error: bool,
  #[serde(default)]
  pub message: String,
  pub story: Option<Story>,
}
