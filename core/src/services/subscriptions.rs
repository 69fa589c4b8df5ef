use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

pub const PATH: &str = "/subscriptions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

/// A user's enrolment in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.ends_at.map_or(true, |end| now < end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
}

pub fn list_for_user(client: &ApiClient, user_id: Uuid) -> Result<Vec<Subscription>, ApiError> {
    client.request(&ApiRequest::get(format!("/users/{user_id}/subscriptions")))
}

pub fn subscribe(client: &ApiClient, input: &NewSubscription) -> Result<Subscription, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

pub fn cancel(client: &ApiClient, id: Uuid) -> Result<Subscription, ApiError> {
    client.request(&ApiRequest::post(format!("{PATH}/{id}/cancel")))
}
