//! Per-resource services.
//!
//! Every function here performs exactly one call through `ApiClient` (the
//! one exception is `auth::logout`, which only clears local credentials).
//! DTOs use camelCase on the wire.

pub mod auth;
pub mod challenges;
pub mod chat;
pub mod class_groups;
pub mod metrics;
pub mod plans;
pub mod subscriptions;
pub mod training_groups;
pub mod users;

use serde::{Deserialize, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.total_pages
    }
}

/// Paging parameters shared by listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }
}
