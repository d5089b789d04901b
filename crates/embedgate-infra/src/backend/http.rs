//! Shared HTTP transport for the remote backend adapters.
//!
//! Each remote adapter issues exactly one JSON POST per inference with a
//! fixed timeout. Anything other than HTTP 200 is a failure.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use embedgate_types::error::{BackendError, LoadError};

/// Timeout applied to every backend call unless configured otherwise.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Error bodies longer than this are truncated in logs.
const MAX_ERROR_BODY: usize = 512;

/// A reqwest client bound to one backend base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Validate `endpoint` and build a client with the given timeout.
    ///
    /// Only `http` and `https` URLs are accepted. A trailing slash is dropped
    /// so paths can be appended verbatim.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LoadError> {
        let invalid = |reason: String| LoadError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = reqwest::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::RuntimeUnavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a given path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` as JSON to `path` and decode a JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::MalformedResponse(e.to_string())
            }
        })
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
