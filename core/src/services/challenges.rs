use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::metrics::MetricType;
use super::{Page, PageRequest};

pub const PATH: &str = "/challenges";

/// A time-boxed competition on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub metric_type: MetricType,
    pub goal: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub participant_count: u32,
}

impl Challenge {
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChallengeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub metric_type: MetricType,
    pub goal: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub display_name: String,
    pub score: f64,
    pub rank: u32,
}

pub fn list(client: &ApiClient, filter: &ChallengeFilter) -> Result<Page<Challenge>, ApiError> {
    client.request(&ApiRequest::get(PATH).query(filter)?)
}

pub fn get(client: &ApiClient, id: Uuid) -> Result<Challenge, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}")))
}

pub fn create(client: &ApiClient, input: &NewChallenge) -> Result<Challenge, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

/// Join as the signed-in user.
pub fn join(client: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    client.request(&ApiRequest::post(format!("{PATH}/{id}/participants")))
}

pub fn leaderboard(client: &ApiClient, id: Uuid) -> Result<Vec<LeaderboardEntry>, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}/leaderboard")))
}
