//! Canned transport for unit tests.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::credentials::{Credentials, CredentialsProvider, NoCredentials, StaticCredentials};
use crate::error::ApiError;
use crate::http::{status_text, HttpRequest, HttpResponse, StreamResponse};
use crate::transport::Transport;

pub const BASE_URL: &str = "http://localhost:8080";

/// Answers every request with the same status and body, remembering what
/// it was asked.
pub struct CannedTransport {
    status: u16,
    body: Option<String>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    pub fn new(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: Some(body.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn without_body(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn last(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request recorded")
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Transport for CannedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: Vec::new(),
            body: self.body.clone().unwrap_or_default(),
        })
    }

    fn execute_stream(&self, request: HttpRequest) -> Result<StreamResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        Ok(StreamResponse {
            status: self.status,
            status_text: status_text(self.status),
            headers: Vec::new(),
            body: self
                .body
                .clone()
                .map(|b| Box::new(Cursor::new(b.into_bytes())) as Box<dyn std::io::Read>),
        })
    }
}

pub fn signed_in() -> Arc<dyn CredentialsProvider> {
    Arc::new(StaticCredentials(Credentials::new("tok-123", "user-42")))
}

pub fn anonymous() -> Arc<dyn CredentialsProvider> {
    Arc::new(NoCredentials)
}

pub fn client_with(transport: Arc<CannedTransport>, credentials: Arc<dyn CredentialsProvider>) -> ApiClient {
    ApiClient::new(ClientConfig::new(BASE_URL), credentials, transport)
}
