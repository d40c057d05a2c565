/// Blocking HTTP transport backed by `reqwest`.
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use super::{ApiError, ApiPath, Method, RawResponse, Transport};

pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Build a client rooted at `api_base` (e.g. `https://host/api`).
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(api_base)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{api_base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(api_base.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("estimate-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport {
                path: api_base.to_string(),
                message: format!("HTTP client build failed: {e}"),
            })?;

        Ok(Self { client, base })
    }

    /// Absolute URL for `path`; each segment is percent-encoded.
    pub fn url_for(&self, path: &ApiPath) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.url_for(path)?;
        let method_name = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self.client.request(method_name, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| ApiError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| ApiError::Transport {
            path: path.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        debug!("{method} {path} -> {status}");
        Ok(RawResponse::new(status, text))
    }
}
