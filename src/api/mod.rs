/// REST access to the estimate backend.
///
/// [`Transport`] is the seam: [`http::HttpTransport`] talks to the real
/// service, [`mock::MockTransport`] emulates it in memory for tests.
/// [`client::EntityClient`] speaks the per-entity route table on top of
/// either.
pub mod client;
pub mod http;
pub mod mock;
pub mod wire;

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("{operation} failed (HTTP {status}): {payload}")]
    Status {
        operation: String,
        status: u16,
        payload: String,
    },

    #[error("{id_field} missing from {entity} create response")]
    MissingId { entity: String, id_field: String },

    #[error("invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// A request path relative to the API base, kept as unencoded segments.
/// Transports are responsible for percent-encoding each segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// Split a route template on `/`, substituting `id` for any `{id}`
    /// segment. The id stays a single segment even if it contains `/`.
    #[must_use]
    pub fn expand(template: &str, id: Option<&str>) -> Self {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match (s, id) {
                ("{id}", Some(id)) => id.to_string(),
                _ => s.to_string(),
            })
            .collect();
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON; `None` for empty or non-JSON bodies.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }

    /// Failure text shown to the user: the whole server body, or the status
    /// line when the body is empty.
    #[must_use]
    pub fn error_payload(&self) -> String {
        let body = self.body.trim();
        if body.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            body.to_string()
        }
    }
}

/// Sends one request and returns whatever came back. Non-2xx statuses are
/// *not* errors at this level; only failures to complete the exchange are.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError>;
}
