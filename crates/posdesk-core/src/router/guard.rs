use super::location::Location;
use super::routes::{RouteName, AUTHENTICATED_LANDING};
use super::Route;
use crate::auth::SessionStore;

/// Outcome of checking one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// Gates `requires_auth` routes on the current session. It never touches the
/// network; an expired token is only discovered when the API answers 401.
#[derive(Clone)]
pub struct AuthGuard {
    session: SessionStore,
}

impl AuthGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn check(&self, to: &Route) -> GuardDecision {
        decide(self.session.is_authenticated(), to)
    }
}

/// The transition table on its own, for a given authentication state.
pub fn decide(is_authenticated: bool, to: &Route) -> GuardDecision {
    if to.requires_auth && !is_authenticated {
        let login = Location::new(RouteName::Login.pattern())
            .with_query("redirect", to.full_path.clone());
        GuardDecision::Redirect(login)
    } else if is_authenticated && to.name.map(|n| n.is_auth_page()).unwrap_or(false) {
        GuardDecision::Redirect(Location::new(AUTHENTICATED_LANDING))
    } else {
        GuardDecision::Allow
    }
}
