//! Transport boundary: the trait every outbound request crosses, plus the
//! request-level response cache layered beneath the API client.

mod cache;
mod transport;

pub use cache::{CacheError, CachingTransport, ResponseCache};
pub use transport::{
  HttpRequest, HttpResponse, Method, PhotoPart, ReqwestTransport, RequestBody, Transport,
  TransportError,
};
