use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::{Page, PageRequest};

pub const PATH: &str = "/users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Trainer,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial update. Omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pub fn list(client: &ApiClient, filter: &UserFilter) -> Result<Page<User>, ApiError> {
    client.request(&ApiRequest::get(PATH).query(filter)?)
}

pub fn get(client: &ApiClient, id: Uuid) -> Result<User, ApiError> {
    client.request(&ApiRequest::get(format!("{PATH}/{id}")))
}

pub fn create(client: &ApiClient, input: &NewUser) -> Result<User, ApiError> {
    client.request(&ApiRequest::post(PATH).json(input)?)
}

pub fn update(client: &ApiClient, id: Uuid, input: &UserUpdate) -> Result<User, ApiError> {
    client.request(&ApiRequest::patch(format!("{PATH}/{id}")).json(input)?)
}

pub fn delete(client: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    client.request(&ApiRequest::delete(format!("{PATH}/{id}")))
}

/// Upload raw image bytes. `content_type` is passed through verbatim
/// (e.g. `image/png`).
pub fn upload_avatar(client: &ApiClient, id: Uuid, image: Vec<u8>, content_type: &str) -> Result<User, ApiError> {
    client.request(
        &ApiRequest::put(format!("{PATH}/{id}/avatar"))
            .binary(image)
            .header("Content-Type", content_type),
    )
}
