//! # Backend Client
//!
//! Authenticated HTTP plumbing shared by every endpoint binding:
//! base-URL normalization, timeouts, session cookies, and the common
//! response handling (error payload extraction, auth-expiry detection).

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Default timeout for backend requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

/// Normalizes the configured backend URL:
/// - strip trailing slashes
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// Backend handle
// ---------------------------------------------------------------------------

/// Error payload shape the backend uses for non-2xx responses.
/// Some endpoints say `error`, a couple of older ones say `mensaje`.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    mensaje: Option<String>,
}

/// Shared backend handle. Cheap to clone; endpoint bindings live in the
/// sibling modules as further `impl Backend` blocks.
#[derive(Debug, Clone)]
pub struct Backend {
    http: Client,
    base: Url,
}

impl Backend {
    /// Creates a client against the given base URL.
    ///
    /// The session authenticates with cookies, so the cookie store is
    /// enabled; there is no retry layer (failures surface immediately
    /// as notifications).
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let normalized = normalize_base_url(base_url);
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{normalized}: {e}")))?;

        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Backend { http, base })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{path}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(url.as_str(), e))?;

        Self::handle(url, response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(url.as_str(), e))?;

        Self::handle(url, response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "PUT");

        let response = self
            .http
            .put(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(url.as_str(), e))?;

        Self::handle(url, response).await
    }

    /// Common response handling: auth expiry, backend error payloads,
    /// then JSON decoding.
    async fn handle<T: DeserializeOwned>(url: Url, response: Response) -> ApiResult<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%url, %status, "Backend session rejected");
            return Err(ApiError::Unauthenticated);
        }

        if !status.is_success() {
            // the backend wraps failures as {"error": "..."} (or
            // {"mensaje": "..."} on a couple of endpoints)
            let message = response
                .json::<ErrorPayload>()
                .await
                .ok()
                .and_then(|p| p.error.or(p.mensaje));

            return Err(match message {
                Some(message) => ApiError::Backend(message),
                None => ApiError::from_status(status),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
