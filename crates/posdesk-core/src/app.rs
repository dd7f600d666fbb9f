//! Application wiring for posdesk.
//!
//! `App` builds one session store, one router and one gateway, connects the
//! gateway's middleware to both, and exposes the login/logout flows that
//! move between the login screen and the pending destination.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{
    ApiClient, ApiError, BearerAuth, Gateway, LogoutOnUnauthorized, ReqwestTransport, RequestLog,
    Transport,
};
use crate::auth::{FileStorage, SessionStorage, SessionStore};
use crate::config::Config;
use crate::models::{LoginRequest, RegisterRequest};
use crate::router::{Location, Route, RouteName, Router, RouterError, AUTHENTICATED_LANDING};

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub router: Router,
    pub api: ApiClient,
    config_path: Option<PathBuf>,
}

impl App {
    /// Production wiring: session file in the cache dir, reqwest transport,
    /// base URL resolved from env/config.
    pub fn new(config: Config) -> Result<Self> {
        let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::new(config.cache_dir()?));
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
        let base_url = config.resolve_api_base_url();
        info!(base_url = %base_url, "Using API");

        let mut app = Self::with_parts(config, &base_url, storage, transport);
        app.config_path = Some(Config::default_path()?);
        Ok(app)
    }

    /// Wire an app from explicit parts. Config changes are kept in memory only.
    pub fn with_parts(
        config: Config,
        base_url: &str,
        storage: Arc<dyn SessionStorage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = SessionStore::open(Arc::clone(&storage));
        let router = Router::new(session.clone());

        let gateway = Gateway::new(base_url, transport)
            .with_middleware(RequestLog)
            .with_middleware(BearerAuth::new(storage))
            .with_middleware(LogoutOnUnauthorized::new(session.clone(), router.clone()));

        Self {
            config,
            session,
            router,
            api: ApiClient::new(gateway),
            config_path: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Navigate to a screen. The returned route is where the guard let us land.
    pub fn open(&self, to: impl Into<Location>) -> Result<Route, RouterError> {
        self.router.push(to)
    }

    /// True while the login screen is showing
    pub fn needs_login(&self) -> bool {
        self.router.current().is(RouteName::Login)
    }

    /// Log in, then continue to the pending `redirect` (or the landing page)
    pub async fn attempt_login(&mut self, username: &str, password: &str) -> Result<Route> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(anyhow::anyhow!("Username and password required"));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(anyhow::anyhow!("Username is too long"));
        }

        self.session
            .login(&self.api, &LoginRequest::new(username, password))
            .await?;

        self.remember_username(username);
        let route = self.router.push(self.pending_destination())?;
        info!(to = %route.full_path, "Login successful");
        Ok(route)
    }

    /// Create an account and sign in as it. Refused while signed in, so a
    /// rejected registration cannot end the current session.
    pub async fn register(&mut self, payload: &RegisterRequest) -> Result<Route> {
        if let Some(username) = self.session.username() {
            return Err(anyhow::anyhow!("Already logged in as {}", username));
        }
        if payload.username.trim().is_empty() || payload.email.trim().is_empty() {
            return Err(anyhow::anyhow!("Username and email required"));
        }

        self.session.register(&self.api, payload).await?;

        self.remember_username(&payload.username);
        let route = self.router.push(self.pending_destination())?;
        Ok(route)
    }

    pub fn logout(&self) -> Result<Route, RouterError> {
        self.session.logout();
        self.router.push(RouteName::Login.pattern())
    }

    /// Where to go after a successful login. Only local paths are followed.
    fn pending_destination(&self) -> Location {
        match self.router.current().query_value("redirect") {
            Some(target) if target.starts_with('/') && !target.starts_with("//") => {
                Location::parse(target)
            }
            _ => Location::new(AUTHENTICATED_LANDING),
        }
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());
        if let Some(ref path) = self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }
}

/// Turn a login failure into something to show the user.
pub fn login_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) | Some(ApiError::AccessDenied(_)) => {
            "Invalid username or password".to_string()
        }
        Some(ApiError::NetworkError(_)) => {
            "Unable to connect to server. Check the API address and your connection.".to_string()
        }
        Some(ApiError::Rejected { body, .. }) if !body.is_empty() => {
            format!("Login rejected: {}", body)
        }
        Some(ApiError::ServerError { status, .. }) => {
            format!("Server error ({}). Please try again later.", status)
        }
        _ => format!("Login failed: {}", err),
    }
}
