//! Sign-in and sign-out.
//!
//! `login` is the only place credentials are written; `logout` the only
//! place they are cleared.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::users::User;

pub const LOGIN_PATH: &str = "/auth/login";
pub const ME_PATH: &str = "/auth/me";

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Authenticate and persist the returned credentials and user record.
pub fn login(client: &ApiClient, store: &dyn CredentialStore, input: &LoginRequest) -> Result<User, ApiError> {
    let response: LoginResponse = client.request(&ApiRequest::post(LOGIN_PATH).json(input)?)?;
    let user_record =
        serde_json::to_value(&response.user).map_err(|e| ApiError::Serialization(e.to_string()))?;
    store.save(
        Credentials::new(response.token, response.user.id.to_string()),
        Some(user_record),
    )?;
    tracing::info!(user_id = %response.user.id, "signed in");
    Ok(response.user)
}

/// Forget the stored session. No request is made.
pub fn logout(store: &dyn CredentialStore) -> Result<(), ApiError> {
    store.clear()?;
    tracing::info!("signed out");
    Ok(())
}

pub fn current_user(client: &ApiClient) -> Result<User, ApiError> {
    client.request(&ApiRequest::get(ME_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialsProvider, MemoryCredentialStore};
    use crate::testing::{anonymous, client_with, CannedTransport};
    use std::sync::Arc;

    const LOGIN_OK: &str = r#"{"token":"jwt-abc","user":{"id":"00000000-0000-0000-0000-000000000009","email":"ana@gym.io","firstName":"Ana","lastName":"Ruiz","role":"MEMBER"}}"#;

    fn input() -> LoginRequest {
        LoginRequest {
            email: "ana@gym.io".into(),
            password: "hunter2".into(),
        }
    }

    #[test]
    fn login_saves_credentials_and_user() {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_with(CannedTransport::new(200, LOGIN_OK), anonymous());

        let user = login(&client, store.as_ref(), &input()).unwrap();
        assert_eq!(user.email, "ana@gym.io");

        let creds = store.credentials().unwrap();
        assert_eq!(creds.token, "jwt-abc");
        assert_eq!(creds.user_id, "00000000-0000-0000-0000-000000000009");
        assert_eq!(store.user().unwrap()["firstName"], "Ana");

        logout(store.as_ref()).unwrap();
        assert!(store.credentials().is_none());
    }

    #[test]
    fn failed_login_leaves_store_untouched() {
        let store = MemoryCredentialStore::new();
        let client = client_with(
            CannedTransport::new(401, r#"{"status":"Unauthorized","errors":["Invalid email or password"]}"#),
            anonymous(),
        );
        let err = login(&client, &store, &input()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(store.credentials().is_none());
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", input()).contains("hunter2"));
    }
}
