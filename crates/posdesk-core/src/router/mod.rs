//! Client-side routing for the admin screens.
//!
//! `Router::push` resolves a `Location` against the static route table
//! (following record-level redirects), asks the `AuthGuard` whether the
//! transition may happen, and follows guard redirects until a route is
//! allowed. Only the final route is committed as the current one.

pub mod guard;
pub mod location;
pub mod routes;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info};

use crate::auth::SessionStore;

pub use guard::{AuthGuard, GuardDecision};
pub use location::Location;
pub use routes::{RouteName, RouteRecord, AUTHENTICATED_LANDING, ROUTES};

/// Redirect hops tolerated before a navigation is abandoned
const MAX_REDIRECTS: usize = 10;

/// Committed navigations kept in history; older entries are dropped
const MAX_HISTORY: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("No route matches {0}")]
    NoMatch(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

/// A location resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: Option<RouteName>,
    pub path: String,
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub requires_auth: bool,
}

impl Route {
    /// The location before any navigation has happened
    pub fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            full_path: "/".to_string(),
            params: BTreeMap::new(),
            query: Vec::new(),
            requires_auth: false,
        }
    }

    pub fn is(&self, name: RouteName) -> bool {
        self.name == Some(name)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-empty path segments, e.g. `["app", "products"]` for breadcrumbs
    pub fn segments(&self) -> Vec<&str> {
        routes::segments(&self.path)
    }
}

/// Resolve a location to a route, applying record redirects. The query
/// string survives a record redirect.
pub fn resolve(location: Location) -> Result<Route, RouterError> {
    let original = location.full_path();
    let mut location = location;

    for _ in 0..=MAX_REDIRECTS {
        let (record, params) = routes::find(&location.path)
            .ok_or_else(|| RouterError::NoMatch(location.path.clone()))?;

        if let Some(target) = record.redirect {
            location = Location {
                path: Location::new(target).path,
                query: location.query,
            };
            continue;
        }

        return Ok(Route {
            name: record.name,
            full_path: location.full_path(),
            path: location.path,
            params,
            query: location.query,
            requires_auth: record.requires_auth,
        });
    }

    Err(RouterError::RedirectLoop(original))
}

struct RouterState {
    current: Route,
    history: Vec<String>,
}

/// Shared navigation state. Clones drive the same router.
#[derive(Clone)]
pub struct Router {
    guard: AuthGuard,
    state: Arc<RwLock<RouterState>>,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        Self {
            guard: AuthGuard::new(session),
            state: Arc::new(RwLock::new(RouterState {
                current: Route::start(),
                history: Vec::new(),
            })),
        }
    }

    pub fn current(&self) -> Route {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Full paths of the most recent committed navigations in this
    /// process, oldest first
    pub fn history(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }

    /// Navigate, running the guard on every hop. Returns the route actually
    /// reached, which differs from the request when the guard redirected.
    pub fn push(&self, to: impl Into<Location>) -> Result<Route, RouterError> {
        let requested = to.into();
        let original = requested.full_path();
        let mut location = requested;

        for _ in 0..=MAX_REDIRECTS {
            let target = resolve(location)?;
            match self.guard.check(&target) {
                GuardDecision::Allow => return Ok(self.commit(target)),
                GuardDecision::Redirect(next) => {
                    debug!(from = %target.full_path, to = %next.full_path(), "Guard redirected navigation");
                    location = next;
                }
            }
        }

        Err(RouterError::RedirectLoop(original))
    }

    fn commit(&self, route: Route) -> Route {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.current.full_path == route.full_path {
            debug!(path = %route.full_path, "Already at location");
            return route;
        }
        info!(
            from = %state.current.full_path,
            to = %route.full_path,
            route = route.name.map(|n| n.as_str()).unwrap_or("-"),
            "Navigated"
        );
        if state.history.len() == MAX_HISTORY {
            state.history.remove(0);
        }
        state.history.push(route.full_path.clone());
        state.current = route.clone();
        route
    }
}
