//! HTTP transport trait and reqwest-backed implementation.
//!
//! The transport executes an already-prepared request. Endpoint
//! classification, header injection, and trace capture all happen in the
//! pipeline before and after this layer, so the transport stays a thin
//! adapter over the HTTP client.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::pipeline::{BackendResponse, OutboundRequest};
use serde_json::Value;

/// HTTP transport to the backend.
///
/// # Contract
///
/// - Any HTTP status, including 4xx/5xx, resolves to `Ok`: the backend
///   answered, and its response metadata (trace headers included) must reach
///   the response side of the pipeline. Only connect failures and timeouts
///   are `Err`.
/// - Each call is bounded by the fixed timeout configured at construction.
pub trait Transport: Send + Sync {
    /// Execute a prepared request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError::Timeout`] when the deadline passes and
    /// [`crate::SessionError::Transport`] for other network failures.
    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl std::future::Future<Output = Result<BackendResponse>> + Send;
}

/// Production transport over [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from the session configuration.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<BackendResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = request.body {
            // Content type was already defaulted by the injector; setting the
            // body bytes directly keeps an explicit caller content type intact.
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        // Empty and non-JSON bodies are normal (health endpoints, proxies);
        // the pipeline treats Null as "no body fields".
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}
