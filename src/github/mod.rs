//! Read-only access to the source-control hosting API.
//!
//! Everything above this module talks to a [`Source`]; the production
//! implementation is [`ApiClient`], tests use `fake::FakeSource`.

pub mod endpoints;
pub mod models;

#[cfg(test)]
pub mod fake;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Media type for the hosting API's structured JSON responses.
pub const ACCEPT: &str = "application/vnd.github+json";

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A place JSON documents can be fetched from by endpoint path.
///
/// `Sync` so one source can be shared by the sections of a pass running
/// side by side.
pub trait Source: Sync {
    fn get_json(&self, path: &str) -> Result<Value, ApiError>;
}

/// Fetch `path` and decode it into `T`.
pub fn fetch<T: DeserializeOwned>(source: &dyn Source, path: &str) -> Result<T, ApiError> {
    let value = source.get_json(path)?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// HTTP client for the hosting API.
///
/// One attempt per call, no retries and no timeout. Failures surface as
/// [`ApiError`] and it is up to the caller to isolate them.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`, attaching `token` as a bearer
    /// credential when present.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn transport(path: &str, e: &ureq::Error) -> ApiError {
        ApiError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        }
    }
}

impl Source for ApiClient {
    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, authorized = self.token.is_some(), "GET");

        let mut request = self.agent.get(&url).header("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let body = match request.call() {
            Ok(response) => response
                .into_body()
                .read_to_string()
                .map_err(|e| Self::transport(path, &e))?,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(ApiError::Status {
                    status,
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(Self::transport(path, &e)),
        };

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
