//! The I/O half of the host-does-IO split.
//!
//! `ApiClient` hands a plain-data `HttpRequest` to a `Transport` and gets a
//! plain-data response back. `UreqTransport` is the blocking implementation
//! used in production and in the integration tests; tests of the pure logic
//! plug in a canned transport instead.

use std::io::Read;
use std::time::Duration;

use ureq::http::{HeaderMap, Response, StatusCode};
use ureq::typestate::WithBody;
use ureq::{Body, RequestBuilder};

use crate::error::ApiError;
use crate::http::{status_text, HttpBody, HttpMethod, HttpRequest, HttpResponse, StreamResponse};

/// Executes HTTP round-trips.
pub trait Transport: Send + Sync {
    /// Execute and read the whole body as text.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Execute and hand back the body unread.
    fn execute_stream(&self, request: HttpRequest) -> Result<StreamResponse, ApiError>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// Status codes are never turned into transport errors: 4xx/5xx come back as
/// data so the client can normalize them.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    fn send(&self, request: HttpRequest) -> Result<Response<Body>, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => send_body(with_headers(self.agent.post(&url), &headers), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(&url), &headers), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(&url), &headers), body),
        };

        result.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "transport failure");
            ApiError::Transport(e.to_string())
        })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut response = self.send(request)?;
        let status = response.status().as_u16();
        let headers = response_headers(response.headers());
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn execute_stream(&self, request: HttpRequest) -> Result<StreamResponse, ApiError> {
        let response = self.send(request)?;
        let status = response.status();
        let headers = response_headers(response.headers());
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status_text(status.as_u16()));

        let has_body = status != StatusCode::NO_CONTENT && response.body().content_length() != Some(0);
        let body = if has_body {
            Some(Box::new(response.into_body().into_reader()) as Box<dyn Read>)
        } else {
            None
        };

        Ok(StreamResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(builder: RequestBuilder<WithBody>, body: Option<HttpBody>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn response_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
