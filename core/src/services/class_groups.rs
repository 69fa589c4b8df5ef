use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::{Page, PageRequest};

pub const PATH: &str = "/class-groups";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    /// Local time of day, `HH:MM`.
    pub start_time: String,
    pub duration_minutes: u32,
}

/// A recurring class with a fixed roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    pub id: Uuid,
    pub name: String,
    pub trainer_id: Uuid,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
    pub capacity: u32,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

impl ClassGroup {
    pub fn free_spots(&self) -> u32 {
        self.capacity.saturating_sub(self.member_ids.len() as u32)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroupFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroupInput {
    pub name: String,
    pub trainer_id: Uuid,
    pub schedule: Vec<ScheduleSlot>,
    pub capacity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MembersBody<'a> {
    member_ids: &'a [Uuid],
}

pub fn list(client: &ApiClient, filter: &ClassGroupFilter) -> Result<Page<ClassGroup>, ApiError> {
    client.request(&ApiRequest::get(PATH).query(filter)?)
}

pub fn get(client: &ApiClient, id: Uuid) -> Result<ClassGroup, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}")))
}

pub fn create(client: &ApiClient, input: &ClassGroupInput) -> Result<ClassGroup, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

pub fn update(client: &ApiClient, id: Uuid, input: &ClassGroupInput) -> Result<ClassGroup, ApiError> {
    client.request(&ApiRequest::put(format!("{PATH}/{id}")).json(input)?)
}

pub fn delete(client: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    client.request(&ApiRequest::delete(format!("{PATH}/{id}")))
}

pub fn add_members(client: &ApiClient, id: Uuid, member_ids: &[Uuid]) -> Result<ClassGroup, ApiError> {
    client.request(&ApiRequest::post(format!("{PATH}/{id}/members")).json(&MembersBody { member_ids })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpBody;
    use crate::testing::{client_with, signed_in, CannedTransport};

    const GROUP: &str = r#"{"id":"00000000-0000-0000-0000-000000000005","name":"Spin 7am","trainerId":"00000000-0000-0000-0000-000000000007","schedule":[{"weekday":"MONDAY","startTime":"07:00","durationMinutes":45}],"capacity":12,"memberIds":["00000000-0000-0000-0000-000000000009"]}"#;

    #[test]
    fn list_filters_by_trainer() {
        let transport = CannedTransport::new(200, r#"{"content":[],"page":1,"size":5,"totalElements":5,"totalPages":1}"#);
        let client = client_with(transport.clone(), signed_in());
        let filter = ClassGroupFilter {
            trainer_id: Some(Uuid::nil()),
            page: PageRequest::new(1, 5),
            ..Default::default()
        };
        list(&client, &filter).unwrap();
        assert_eq!(
            transport.last().url,
            "http://localhost:8080/class-groups?trainerId=00000000-0000-0000-0000-000000000000&page=1&size=5"
        );
    }

    #[test]
    fn add_members_sends_ids() {
        let transport = CannedTransport::new(200, GROUP);
        let client = client_with(transport.clone(), signed_in());
        let group = add_members(&client, Uuid::nil(), &[Uuid::nil()]).unwrap();
        assert_eq!(group.free_spots(), 11);
        assert_eq!(group.schedule[0].weekday, Weekday::Monday);
        assert_eq!(
            transport.last().body,
            Some(HttpBody::Json(r#"{"memberIds":["00000000-0000-0000-0000-000000000000"]}"#.to_string()))
        );
    }
}
