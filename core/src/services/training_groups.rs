use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::{Page, PageRequest};

pub const PATH: &str = "/training-groups";

/// A coached group that trains toward a shared goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trainer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingGroupFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub levels: Vec<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingGroupInput {
    pub name: String,
    pub description: String,
    pub trainer_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

pub fn list(client: &ApiClient, filter: &TrainingGroupFilter) -> Result<Page<TrainingGroup>, ApiError> {
    client.request(&ApiRequest::get(PATH).query(filter)?)
}

pub fn get(client: &ApiClient, id: Uuid) -> Result<TrainingGroup, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}")))
}

pub fn create(client: &ApiClient, input: &TrainingGroupInput) -> Result<TrainingGroup, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

pub fn update(client: &ApiClient, id: Uuid, input: &TrainingGroupInput) -> Result<TrainingGroup, ApiError> {
    client.request(&ApiRequest::put(format!("{PATH}/{id}")).json(input)?)
}

pub fn delete(client: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    client.request(&ApiRequest::delete(format!("{PATH}/{id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client_with, signed_in, CannedTransport};

    #[test]
    fn list_without_filters_has_no_query() {
        let transport = CannedTransport::new(200, r#"{"content":[{"id":"00000000-0000-0000-0000-000000000002","name":"Marathon prep","trainerId":"00000000-0000-0000-0000-000000000007"}]}"#);
        let client = client_with(transport.clone(), signed_in());
        let page = list(&client, &TrainingGroupFilter::default()).unwrap();
        assert_eq!(page.content[0].member_count, 0);
        assert!(page.content[0].level.is_none());
        assert_eq!(transport.last().url, "http://localhost:8080/training-groups");
    }

    #[test]
    fn levels_repeat() {
        let transport = CannedTransport::new(200, r#"{"content":[]}"#);
        let client = client_with(transport.clone(), signed_in());
        let filter = TrainingGroupFilter {
            levels: vec!["BEGINNER".into(), "ADVANCED".into()],
            ..Default::default()
        };
        list(&client, &filter).unwrap();
        assert!(transport.last().url.ends_with("?levels=BEGINNER&levels=ADVANCED"));
    }
}
