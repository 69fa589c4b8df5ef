use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

pub const PATH: &str = "/plans";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Active,
    Draft,
    Archived,
}

/// A sellable membership plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in the currency's minor unit.
    pub price_cents: u64,
    pub currency: String,
    pub duration_days: u32,
    pub status: PlanStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanFilter {
    pub status: Vec<PlanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u64,
    pub currency: String,
    pub duration_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

/// Partial update. Omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

pub fn list(client: &ApiClient, filter: &PlanFilter) -> Result<Vec<Plan>, ApiError> {
    client.request(&ApiRequest::get(PATH).query(filter)?)
}

pub fn get(client: &ApiClient, id: Uuid) -> Result<Plan, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}")))
}

pub fn create(client: &ApiClient, input: &NewPlan) -> Result<Plan, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

pub fn update(client: &ApiClient, id: Uuid, input: &PlanUpdate) -> Result<Plan, ApiError> {
    client.request(&ApiRequest::put(format!("{PATH}/{id}")).json(input)?)
}

pub fn delete(client: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    client.request(&ApiRequest::delete(format!("{PATH}/{id}")))
}
