//! Typed HTTP client for the coachboard backend.
//!
//! # Design
//! `ApiClient` carries configuration and two injected collaborators: a
//! `CredentialsProvider` consulted on every request and a `Transport` that
//! performs the round-trip. It holds no per-call state.
//!
//! Each call is split into `build_request` (descriptor to plain-data
//! `HttpRequest`) and `parse_response` (plain-data `HttpResponse` to a typed
//! value or `ApiError`). `request` and `request_stream` glue the two halves
//! to the transport. No caching and no retries happen at any layer.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::credentials::CredentialsProvider;
use crate::error::ApiError;
use crate::http::{HttpBody, HttpRequest, HttpResponse, StreamResponse};
use crate::request::{ApiRequest, RequestBody};
use crate::stream::ByteStream;
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    credentials: Arc<dyn CredentialsProvider>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialsProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
        }
    }

    /// Client backed by a blocking `UreqTransport` honoring `config.timeout`.
    pub fn with_ureq(config: ClientConfig, credentials: Arc<dyn CredentialsProvider>) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout));
        Self::new(config, credentials, transport)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the URL, inject credentials and encode the body.
    pub fn build_request(&self, request: &ApiRequest) -> Result<HttpRequest, ApiError> {
        let url = self.resolve_url(request)?;

        let mut headers: Vec<(String, String)> = Vec::new();
        if let Some(credentials) = self.credentials.credentials() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", credentials.token)));
            headers.push((self.config.user_id_header.clone(), credentials.user_id));
        }

        let body = if request.method.is_bodiless() {
            None
        } else {
            match &request.body {
                Some(RequestBody::Json(value)) => {
                    headers.push(("Content-Type".to_string(), "application/json".to_string()));
                    let encoded = serde_json::to_string(value)
                        .map_err(|e| ApiError::Serialization(e.to_string()))?;
                    Some(HttpBody::Json(encoded))
                }
                Some(RequestBody::Binary(bytes)) => Some(HttpBody::Binary(bytes.clone())),
                None => None,
            }
        };

        for (name, value) in &request.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        Ok(HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Decode a 2xx body as `T`, or normalize the failure.
    ///
    /// An empty 2xx body decodes as JSON `null`, so `()` and `Option<_>`
    /// work for `204 No Content`.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            tracing::warn!(status = response.status, error = %err, "request failed");
            return Err(err);
        }
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Check a streaming response head and hand back the body.
    pub fn parse_stream(&self, response: StreamResponse) -> Result<ByteStream, ApiError> {
        let StreamResponse {
            status,
            status_text,
            body,
            ..
        } = response;

        if !(200..300).contains(&status) {
            let mut text = String::new();
            if let Some(mut reader) = body {
                // best effort: an unreadable error body falls back to status text
                let _ = reader.read_to_string(&mut text);
            }
            let err = ApiError::from_stream_failure(status, &status_text, &text);
            tracing::warn!(status, error = %err, "stream request failed");
            return Err(err);
        }

        match body {
            Some(reader) => ByteStream::open(status, reader),
            None => Err(ApiError::EmptyStream { status }),
        }
    }

    pub fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let http = self.build_request(request)?;
        tracing::debug!(method = %http.method, url = %http.url, "sending request");
        let response = self.transport.execute(http)?;
        self.parse_response(response)
    }

    /// Like `request`, but returns the body as a `ByteStream`.
    pub fn request_stream(&self, request: &ApiRequest) -> Result<ByteStream, ApiError> {
        let http = self.build_request(request)?;
        tracing::debug!(method = %http.method, url = %http.url, "opening stream");
        let response = self.transport.execute_stream(http)?;
        self.parse_stream(response)
    }

    fn resolve_url(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let base = request
            .base_url
            .as_deref()
            .unwrap_or(&self.config.base_url)
            .trim_end_matches('/');

        let mut url = match request.path.as_str() {
            "" => base.to_string(),
            p if p.starts_with('/') => format!("{base}{p}"),
            p => format!("{base}/{p}"),
        };

        let query = request.query.encode();
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        url::Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(url)
    }
}
