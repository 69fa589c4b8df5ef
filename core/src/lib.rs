//! Client core for the coachboard training-management backend.
//!
//! # Overview
//! Two mechanisms back every dashboard screen:
//! - `ApiClient`: typed HTTP calls with credential injection, repeated-key
//!   query encoding, backend error normalization and a streaming variant.
//! - `form`: a validation registry fields subscribe to, gating submission.
//!
//! # Design
//! - Host-does-IO: `ApiClient::build_request` and `parse_response` are pure;
//!   a `Transport` (blocking ureq by default) does the round-trip.
//! - Credentials are injected through `CredentialsProvider`, never read from
//!   ambient storage.
//! - `services` holds one module per backend resource; each function makes
//!   exactly one call.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod form;
pub mod http;
pub mod notify;
pub mod query;
pub mod request;
pub mod services;
pub mod stream;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use credentials::{
    CredentialStore, Credentials, CredentialsProvider, FileCredentialStore, MemoryCredentialStore, NoCredentials,
    StaticCredentials,
};
pub use error::{ApiError, ServerError};
pub use form::{Form, FormContext, FormField, Rule, SubmitOutcome, Subscription};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, StreamResponse};
pub use notify::{Level, Notification, NotificationLog, Notifier, TracingNotifier};
pub use query::{QueryParams, QueryValue};
pub use request::{ApiRequest, RequestBody};
pub use stream::{ByteStream, TextChunks};
pub use transport::{Transport, UreqTransport};
