use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;
use url::Url;

use crate::net::{HttpRequest, HttpResponse, PhotoPart, RequestBody, Transport};

use super::types::{CreateEnvelope, DetailEnvelope, ListEnvelope, ListFilter, Story, StoryDraft};
use super::ApiError;

/// The remote boundary as the sync layer sees it.
///
/// Kept as a trait so the orchestrator can be driven against a stub backend
/// in tests.
#[async_trait]
pub trait RemoteApi: Send + Sync {
  async fn list_stories(&self, token: &str, filter: &ListFilter) -> Result<Vec<Story>, ApiError>;

  async fn story_detail(&self, token: &str, id: &str) -> Result<Story, ApiError>;

  /// Authenticated create. The backend may acknowledge without echoing the
  /// stored record, hence `Option`.
  async fn create_story(&self, token: &str, draft: &StoryDraft)
    -> Result<Option<Story>, ApiError>;

  /// Guest create: fire-and-forget, no credential.
  async fn create_story_guest(&self, draft: &StoryDraft) -> Result<Option<Story>, ApiError>;
}

/// Stateless request/response mapping to the story backend.
pub struct ApiClient<T: Transport> {
  transport: T,
  base_url: String,
}

impl<T: Transport> ApiClient<T> {
  pub fn new(transport: T, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      transport,
    }
  }

  fn list_url(&self, filter: &ListFilter) -> Result<String, ApiError> {
    let mut url = Url::parse(&format!("{}/stories", self.base_url))
      .map_err(|e| ApiError::Transport(format!("invalid API URL: {e}")))?;

    {
      let mut query = url.query_pairs_mut();
      if let Some(page) = filter.page {
        query.append_pair("page", &page.to_string());
      }
      if let Some(size) = filter.size {
        query.append_pair("size", &size.to_string());
      }
      if let Some(with_location) = filter.with_location {
        query.append_pair("location", if with_location { "1" } else { "0" });
      }
    }

    // An empty query string would cache-key differently from no query at all
    if url.query() == Some("") {
      url.set_query(None);
    }

    Ok(url.into())
  }

  async fn form_body(&self, draft: &StoryDraft) -> Result<RequestBody, ApiError> {
    let bytes = tokio::fs::read(&draft.photo_path)
      .await
      .map_err(|e| ApiError::Photo {
        path: draft.photo_path.display().to_string(),
        source: e,
      })?;

    let mut fields = vec![("description".to_string(), draft.description.clone())];
    if let Some(lat) = draft.lat {
      fields.push(("lat".to_string(), lat.to_string()));
    }
    if let Some(lon) = draft.lon {
      fields.push(("lon".to_string(), lon.to_string()));
    }

    Ok(RequestBody::Form {
      fields,
      photo: PhotoPart {
        file_name: file_name(&draft.photo_path),
        mime: photo_mime(&draft.photo_path).to_string(),
        bytes,
      },
    })
  }

  async fn create_at(
    &self,
    url: String,
    token: Option<&str>,
    draft: &StoryDraft,
  ) -> Result<Option<Story>, ApiError> {
    let body = self.form_body(draft).await?;
    let request = HttpRequest::post(url, token.map(String::from), body);
    let response = self.transport.send(&request).await?;

    let envelope: CreateEnvelope = parse(&response)?;
    if envelope.error {
      return Err(ApiError::Server {
        message: envelope.message,
      });
    }
    Ok(envelope.story)
  }
}

#[async_trait]
impl<T: Transport> RemoteApi for ApiClient<T> {
  async fn list_stories(&self, token: &str, filter: &ListFilter) -> Result<Vec<Story>, ApiError> {
    let request = HttpRequest::get(self.list_url(filter)?, Some(token.to_string()));
    let response = self.transport.send(&request).await?;

    let envelope: ListEnvelope = parse(&response)?;
    if envelope.error {
      return Err(ApiError::Server {
        message: envelope.message,
      });
    }
    Ok(envelope.list_story)
  }

  async fn story_detail(&self, token: &str, id: &str) -> Result<Story, ApiError> {
    let url = format!("{}/stories/{id}", self.base_url);
    let request = HttpRequest::get(url, Some(token.to_string()));
    let response = self.transport.send(&request).await?;

    let envelope: DetailEnvelope = parse(&response)?;
    if envelope.error {
      return Err(ApiError::Server {
        message: envelope.message,
      });
    }
    envelope
      .story
      .ok_or_else(|| ApiError::Transport("story missing from response body".to_string()))
  }

  async fn create_story(
    &self,
    token: &str,
    draft: &StoryDraft,
  ) -> Result<Option<Story>, ApiError> {
    let url = format!("{}/stories", self.base_url);
    self.create_at(url, Some(token), draft).await
  }

  async fn create_story_guest(&self, draft: &StoryDraft) -> Result<Option<Story>, ApiError> {
    let url = format!("{}/stories/guest", self.base_url);
    self.create_at(url, None, draft).await
  }
}

/// Decode an envelope. An unparseable body counts as a transport failure:
/// it means no usable response arrived (captive portal, truncated read), so
/// the fallback path upstream still applies.
fn parse<E: DeserializeOwned>(response: &HttpResponse) -> Result<E, ApiError> {
  serde_json::from_slice(&response.body)
    .map_err(|e| ApiError::Transport(format!("unreadable response body: {e}")))
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "photo".to_string())
}

fn photo_mime(path: &Path) -> &'static str {
  match path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase())
    .as_deref()
  {
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("png") => "image/png",
    Some("webp") => "image/webp",
    Some("gif") => "image/gif",
    _ => "application/octet-stream",
  }
}
