//! The transport seam beneath the API client.
//!
//! Requests are plain data so they can be inspected, cached by key, and
//! replayed against a stub in tests. [`ReqwestTransport`] is the real
//! implementation.

use async_trait::async_trait;
use thiserror::Error;

/// Request methods the story backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
    }
  }
}

/// One photo attachment for a multipart create request.
#[derive(Debug, Clone)]
pub struct PhotoPart {
  pub file_name: String,
  pub mime: String,
  pub bytes: Vec<u8>,
}

/// Body of an outbound request.
#[derive(Debug, Clone)]
pub enum RequestBody {
  Empty,
  /// Multipart form: text fields plus the photo part.
  Form {
    fields: Vec<(String, String)>,
    photo: PhotoPart,
  },
}

/// An outbound request, carried as data across the transport boundary.
///
/// The bearer credential travels with each request rather than living in the
/// transport, so independent transports (and the response cache beneath
/// them) share no authentication state.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: String,
  pub bearer: Option<String>,
  pub body: RequestBody,
}

impl HttpRequest {
  pub fn get(url: impl Into<String>, bearer: Option<String>) -> Self {
    Self {
      method: Method::Get,
      url: url.into(),
      bearer,
      body: RequestBody::Empty,
    }
  }

  pub fn post(url: impl Into<String>, bearer: Option<String>, body: RequestBody) -> Self {
    Self {
      method: Method::Post,
      url: url.into(),
      bearer,
      body,
    }
  }
}

/// A response that actually arrived, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// No response was received at all: DNS, connect, timeout, reset.
///
/// This is distinct from a response carrying an error status; only a
/// `TransportError` triggers cache fallback upstream.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared reqwest client.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = match request.method {
      Method::Get => self.client.get(&request.url),
      Method::Post => self.client.post(&request.url),
    };

    if let Some(token) = &request.bearer {
      builder = builder.bearer_auth(token);
    }

    if let RequestBody::Form { fields, photo } = &request.body {
      let mut form = reqwest::multipart::Form::new();
      for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
      }
      let part = reqwest::multipart::Part::bytes(photo.bytes.clone())
        .file_name(photo.file_name.clone())
        .mime_str(&photo.mime)
        .map_err(|e| TransportError(format!("invalid photo mime type: {e}")))?;
      form = form.part("photo", part);
      builder = builder.multipart(form);
    }

    let response = builder
      .send()
      .await
      .map_err(|e| TransportError(e.to_string()))?;

    let status = response.status().as_u16();
    let content_type = response
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(String::from);

    let body = response
      .bytes()
      .await
      .map_err(|e| TransportError(e.to_string()))?
      .to_vec();

    Ok(HttpResponse {
      status,
      content_type,
      body,
    })
  }
}
