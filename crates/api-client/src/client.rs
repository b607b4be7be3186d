//! JSON API client with bearer injection and a global 401 policy.

use crate::{ApiResult, FailureKind, RequestFailure};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use session_store::SessionStore;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Receives every authentication failure seen by the client.
///
/// Invoked synchronously, before the failing call returns to its caller.
/// `sent_with` is the bearer token the rejected request carried, `None`
/// when it went out without one.
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self, failure: &RequestFailure, sent_with: Option<&str>);
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Do not attach the bearer token (credential exchange endpoints).
    /// The 401 policy still applies.
    pub skip_auth: bool,
    /// Extra headers appended after the defaults.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn without_auth() -> Self {
        Self {
            skip_auth: true,
            ..Default::default()
        }
    }
}

/// Successful response: status plus decoded JSON body (`Null` when empty).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Decode the body into a typed value.
    pub fn json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let status = self.status;
        serde_json::from_value(self.body).map_err(|e| {
            RequestFailure::decode(Some(status), format!("Unexpected response shape: {}", e))
        })
    }
}

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Pull a user-facing message out of an error body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                if !message.trim().is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("error")
    )
}

/// HTTP client adapter for the inventory API.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
    auth_failure_handler: Arc<dyn AuthFailureHandler>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API base address, e.g. `http://localhost:8000/api`
    /// * `store` - source of the bearer token, read before every request
    /// * `auth_failure_handler` - notified on every 401
    /// * `timeout` - transport timeout per request
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<SessionStore>,
        auth_failure_handler: Arc<dyn AuthFailureHandler>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestFailure::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            auth_failure_handler,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> ApiResult<ApiResponse> {
        self.send(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn put(&self, path: &str, body: &serde_json::Value) -> ApiResult<ApiResponse> {
        self.send(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.send(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// Send a request and decode the body into `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.send(method, path, body, options).await?.json()
    }

    /// Send a request to `path` under the base address.
    ///
    /// The token is read from the session store on every call. A 401 is
    /// handed to the auth failure handler and then returned as an error.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.url_for(path);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        let sent_with = if options.skip_auth {
            None
        } else {
            self.store.token()?
        };
        if let Some(token) = &sent_with {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .json(body);
        }

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(method = %method, url = %url, "Sending API request");

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "API request failed in transport");
            RequestFailure::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(RequestFailure::from)?;

        if !status.is_success() {
            let failure = RequestFailure::from_status(status.as_u16(), error_message(status, &text));
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body_summary = %summarize_response_body(&text),
                "API request rejected"
            );

            if failure.kind == FailureKind::Auth {
                self.auth_failure_handler
                    .on_auth_failure(&failure, sent_with.as_deref());
            }
            return Err(failure);
        }

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                warn!(
                    url = %url,
                    body_summary = %summarize_response_body(&text),
                    "API response is not valid JSON"
                );
                RequestFailure::decode(Some(status.as_u16()), format!("Malformed JSON response: {}", e))
            })?
        };

        debug!(method = %method, url = %url, status = status.as_u16(), "API request succeeded");

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}
