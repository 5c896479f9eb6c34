//! HTTP transport seam.
//!
//! Client-side (`csr`): real HTTP calls via `gloo-net`.
//! Everywhere else callers inject their own implementation; the session core
//! never names a concrete HTTP stack.

use async_trait::async_trait;

use super::error::TransportError;
use super::types::{ApiRequest, ApiResponse};

/// Sends one request and returns whatever status the server answered with.
///
/// Non-2xx statuses are responses, not errors; only failures to get an answer
/// at all are `TransportError`s.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(feature = "csr")]
pub struct GlooTransport {
    config: crate::config::SessionConfig,
}

#[cfg(feature = "csr")]
impl GlooTransport {
    pub fn new(config: crate::config::SessionConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "csr")]
#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        use gloo_net::http::Request;

        use super::types::HttpMethod;

        let url = self.config.api_url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
            HttpMethod::Put => Request::put(&url),
            HttpMethod::Patch => Request::patch(&url),
            HttpMethod::Delete => Request::delete(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let outgoing = match &request.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let resp = outgoing
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok(ApiResponse { status, body })
    }
}
