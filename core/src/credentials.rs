//! Credential providers injected into `ApiClient`.
//!
//! # Design
//! The client never reads ambient storage. It asks an injected
//! `CredentialsProvider` for the current token and user id on every request.
//! `CredentialStore` adds the write side used by login and logout.
//!
//! Credential values are secrets: they are never logged and `Credentials`
//! redacts the token in its `Debug` output.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Bearer token plus the id of the signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Read side: what the HTTP client consults on every request.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// Write side: set at login, cleared at logout.
///
/// `user` is the serialized profile of the signed-in user, kept alongside
/// the credentials so a dashboard can render without another round-trip.
pub trait CredentialStore: CredentialsProvider {
    fn save(&self, credentials: Credentials, user: Option<serde_json::Value>) -> Result<(), ApiError>;

    fn clear(&self) -> Result<(), ApiError>;

    fn user(&self) -> Option<serde_json::Value>;
}

impl<P: CredentialsProvider + ?Sized> CredentialsProvider for Arc<P> {
    fn credentials(&self) -> Option<Credentials> {
        (**self).credentials()
    }
}

/// Provider that never has credentials. Used for anonymous clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialsProvider for NoCredentials {
    fn credentials(&self) -> Option<Credentials> {
        None
    }
}

/// Fixed credentials, typically for service accounts and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Session {
    #[serde(flatten)]
    credentials: Option<Credentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<serde_json::Value>,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Session>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            session: RwLock::new(Session {
                credentials: Some(credentials),
                user: None,
            }),
        }
    }

    fn read(&self) -> Session {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&self, session: Session) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl CredentialsProvider for MemoryCredentialStore {
    fn credentials(&self) -> Option<Credentials> {
        self.read().credentials
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credentials: Credentials, user: Option<serde_json::Value>) -> Result<(), ApiError> {
        self.write(Session {
            credentials: Some(credentials),
            user,
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        self.write(Session::default());
        Ok(())
    }

    fn user(&self) -> Option<serde_json::Value> {
        self.read().user
    }
}

/// Store persisted as a JSON file (`{ token, userId, user }`), surviving
/// restarts the way a browser cookie would.
///
/// The file is read on every lookup so several processes sharing it see
/// each other's login and logout.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `config.credentials_path`, i.e. `COACHBOARD_CREDENTIALS_PATH`
    /// or the per-user config directory. `None` when neither is known.
    pub fn from_config(config: &ClientConfig) -> Option<Self> {
        config.credentials_path.as_ref().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Session {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Session::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable credentials file");
                Session::default()
            }
        }
    }
}

impl CredentialsProvider for FileCredentialStore {
    fn credentials(&self) -> Option<Credentials> {
        self.load().credentials
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credentials: Credentials, user: Option<serde_json::Value>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ApiError::Credentials(e.to_string()))?;
        }
        let session = Session {
            credentials: Some(credentials),
            user,
        };
        let raw = serde_json::to_string_pretty(&session)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| ApiError::Credentials(e.to_string()))
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Credentials(e.to_string())),
        }
    }

    fn user(&self) -> Option<serde_json::Value> {
        self.load().user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_lifecycle() {
        let store = MemoryCredentialStore::new();
        assert!(store.credentials().is_none());

        store
            .save(Credentials::new("tok", "u-1"), Some(json!({"name": "Ana"})))
            .unwrap();
        assert_eq!(store.credentials(), Some(Credentials::new("tok", "u-1")));
        assert_eq!(store.user().unwrap()["name"], "Ana");

        store.clear().unwrap();
        assert!(store.credentials().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn file_store_follows_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let path_text = path.to_string_lossy().into_owned();
        let config =
            ClientConfig::from_lookup(|key| (key == "COACHBOARD_CREDENTIALS_PATH").then(|| path_text.clone())).unwrap();

        let store = FileCredentialStore::from_config(&config).unwrap();
        assert_eq!(store.path(), path.as_path());
        store.save(Credentials::new("tok", "u-3"), None).unwrap();
        assert!(path.exists());

        let mut unset = config.clone();
        unset.credentials_path = None;
        assert!(FileCredentialStore::from_config(&unset).is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/credentials.json");

        FileCredentialStore::new(&path)
            .save(Credentials::new("tok", "u-2"), Some(json!({"id": "u-2"})))
            .unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.credentials(), Some(Credentials::new("tok", "u-2")));
        assert_eq!(reopened.user().unwrap()["id"], "u-2");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["token"], "tok");
        assert_eq!(raw["userId"], "u-2");

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert!(reopened.credentials().is_none());
        reopened.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FileCredentialStore::new(&path).credentials().is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let shown = format!("{:?}", Credentials::new("secret-token", "u-1"));
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("u-1"));
    }
}
