use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::storage::SessionStorage;
use crate::api::{ApiClient, ApiError};
use crate::models::{JwtAuthResponse, LoginRequest, RegisterRequest, UserRole};

/// Token, username and role of the signed-in user. They only ever exist
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub username: String,
    pub role: UserRole,
}

impl From<JwtAuthResponse> for Credentials {
    fn from(resp: JwtAuthResponse) -> Self {
        Self {
            token: resp.token,
            username: resp.username,
            role: resp.role,
        }
    }
}

/// Snapshot of the session at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn role(&self) -> Option<UserRole> {
        self.credentials.as_ref().map(|c| c.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role().map(|r| r.is_admin()).unwrap_or(false)
    }

    pub fn is_owner(&self) -> bool {
        self.role() == Some(UserRole::Owner)
    }
}

/// On-disk shape of the session. Every field is optional and unknown roles are
/// kept as text so the bearer stage can still read the token out of a record
/// that the store itself would refuse to rehydrate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl PersistedSession {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse persisted session")
    }

    /// Non-empty token, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    fn from_session(session: &Session) -> Self {
        match session.credentials() {
            Some(c) => Self {
                token: Some(c.token.clone()),
                username: Some(c.username.clone()),
                role: Some(c.role.as_str().to_string()),
            },
            None => Self::default(),
        }
    }

    fn into_session(self) -> Result<Session> {
        match (self.token, self.username, self.role) {
            (None, None, None) => Ok(Session::default()),
            (Some(token), Some(username), Some(role)) => {
                let role = role.parse::<UserRole>().map_err(anyhow::Error::msg)?;
                Ok(Session {
                    credentials: Some(Credentials { token, username, role }),
                })
            }
            _ => Err(anyhow::anyhow!("Persisted session is only partially populated")),
        }
    }
}

/// Process-wide session state, shared by handle.
///
/// Clones point at the same session. Every mutation swaps the whole
/// credential set under the write lock and persists it before the lock is
/// released, so readers never see a half-applied login or logout.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Create an empty store without reading storage
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            storage,
        }
    }

    /// Create a store and rehydrate it from storage. A malformed record is
    /// logged and leaves the session empty.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::new(storage);
        match store.load() {
            Ok(true) => debug!(username = ?store.username(), "Restored persisted session"),
            Ok(false) => debug!("No persisted session"),
            Err(e) => warn!(error = %e, "Ignoring unreadable persisted session"),
        }
        store
    }

    /// Load session from storage. Returns whether a signed-in session was found.
    pub fn load(&self) -> Result<bool> {
        let Some(raw) = self.storage.read()? else {
            return Ok(false);
        };
        let session = PersistedSession::parse(&raw)?.into_session()?;
        let authenticated = session.is_authenticated();
        *self.write_state() = session;
        Ok(authenticated)
    }

    pub fn snapshot(&self) -> Session {
        self.read_state().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.read_state().is_admin()
    }

    pub fn is_owner(&self) -> bool {
        self.read_state().is_owner()
    }

    pub fn username(&self) -> Option<String> {
        self.read_state().username().map(str::to_string)
    }

    pub fn role(&self) -> Option<UserRole> {
        self.read_state().role()
    }

    pub fn set_session(&self, token: impl Into<String>, username: impl Into<String>, role: UserRole) {
        self.replace(Session {
            credentials: Some(Credentials {
                token: token.into(),
                username: username.into(),
                role,
            }),
        });
    }

    pub fn clear_session(&self) {
        self.replace(Session::default());
    }

    pub fn logout(&self) {
        if let Some(username) = self.username() {
            info!(username = %username, "Logging out");
        }
        self.clear_session();
    }

    /// Exchange credentials for a session. On failure the session is cleared
    /// and the error is returned unchanged.
    pub async fn login(&self, api: &ApiClient, credentials: &LoginRequest) -> Result<(), ApiError> {
        match api.login(credentials).await {
            Ok(resp) => {
                self.apply(resp);
                Ok(())
            }
            Err(e) => {
                self.clear_session();
                error!(error = %e, username = %credentials.username, "Login failed");
                Err(e)
            }
        }
    }

    /// Register an account and sign in as it, with the same failure rules as `login`
    pub async fn register(&self, api: &ApiClient, payload: &RegisterRequest) -> Result<(), ApiError> {
        match api.register(payload).await {
            Ok(resp) => {
                self.apply(resp);
                Ok(())
            }
            Err(e) => {
                self.clear_session();
                error!(error = %e, username = %payload.username, "Registration failed");
                Err(e)
            }
        }
    }

    fn apply(&self, resp: JwtAuthResponse) {
        let credentials = Credentials::from(resp);
        info!(username = %credentials.username, role = %credentials.role, "Session established");
        self.replace(Session {
            credentials: Some(credentials),
        });
    }

    fn replace(&self, session: Session) {
        let mut state = self.write_state();
        *state = session;
        let record = PersistedSession::from_session(&state);
        let persisted = serde_json::to_string(&record)
            .map_err(anyhow::Error::from)
            .and_then(|contents| self.storage.write(&contents));
        if let Err(e) = persisted {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
