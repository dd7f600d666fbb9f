//! Stock gateway stages: request logging, bearer credentials, and the
//! logout-and-redirect reaction to 401 responses.

use std::sync::Arc;

use reqwest::header::{self, HeaderValue};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::gateway::{ApiRequest, ApiResponse, Flow, Middleware};
use crate::auth::{PersistedSession, SessionStorage, SessionStore};
use crate::router::{Location, RouteName, Router};

/// Debug-level trace of every call and its status.
pub struct RequestLog;

impl Middleware for RequestLog {
    fn name(&self) -> &'static str {
        "request-log"
    }

    fn on_request(&self, request: &mut ApiRequest) {
        debug!(method = %request.method, path = %request.path, "Sending request");
    }

    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) -> Flow {
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            "Received response"
        );
        Flow::Continue
    }
}

/// Attaches `Authorization: Bearer <token>` from the persisted session record.
///
/// The record is re-read on every request rather than taken from the
/// in-memory store, so a logout written by another process takes effect at
/// once. An unreadable record means the request goes out without a
/// credential.
pub struct BearerAuth {
    storage: Arc<dyn SessionStorage>,
}

impl BearerAuth {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    fn persisted_token(&self) -> Option<String> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                return None;
            }
        };

        match PersistedSession::parse(&raw) {
            Ok(record) => record.bearer_token().map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Persisted session is malformed; sending request without credentials");
                None
            }
        }
    }
}

impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    fn on_request(&self, request: &mut ApiRequest) {
        let Some(token) = self.persisted_token() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                request.headers.insert(header::AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "Persisted token is not a valid header value"),
        }
    }
}

/// On 401: clear the session and, unless already there, send the user to the
/// login screen with the current location as `redirect`.
pub struct LogoutOnUnauthorized {
    session: SessionStore,
    router: Router,
}

impl LogoutOnUnauthorized {
    pub fn new(session: SessionStore, router: Router) -> Self {
        Self { session, router }
    }
}

impl Middleware for LogoutOnUnauthorized {
    fn name(&self) -> &'static str {
        "logout-on-unauthorized"
    }

    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) -> Flow {
        if response.status != StatusCode::UNAUTHORIZED {
            return Flow::Continue;
        }

        warn!(path = %request.path, "Unauthorized response, clearing session");
        self.session.clear_session();

        let current = self.router.current();
        if !current.is(RouteName::Login) {
            let login = Location::new(RouteName::Login.pattern())
                .with_query("redirect", current.full_path.clone());
            if let Err(e) = self.router.push(login) {
                warn!(error = %e, "Failed to redirect to login");
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::{ApiError, Gateway};
    use crate::auth::MemoryStorage;
    use crate::models::UserRole;

    struct Harness {
        storage: Arc<MemoryStorage>,
        session: SessionStore,
        router: Router,
        transport: Arc<MockTransport>,
        gateway: Gateway,
    }

    fn harness(initial: Option<&str>) -> Harness {
        let storage = Arc::new(match initial {
            Some(raw) => MemoryStorage::with_contents(raw),
            None => MemoryStorage::new(),
        });
        let session = SessionStore::new(storage.clone());
        let router = Router::new(session.clone());
        let transport = Arc::new(MockTransport::new());
        let gateway = Gateway::new("http://localhost:1500/api", transport.clone())
            .with_middleware(RequestLog)
            .with_middleware(BearerAuth::new(storage.clone()))
            .with_middleware(LogoutOnUnauthorized::new(session.clone(), router.clone()));
        Harness {
            storage,
            session,
            router,
            transport,
            gateway,
        }
    }

    #[tokio::test]
    async fn test_bearer_from_persisted_record() {
        let h = harness(Some(r#"{"token":"abc","role":"ADMIN"}"#));
        h.transport.push_json(200, json!([]));

        let _: Vec<Value> = h.gateway.get("/products").await.expect("ok response");

        let sent = h.transport.last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_malformed_record_sends_without_credentials() {
        let h = harness(Some("definitely not json"));
        h.transport.push_json(200, json!([]));

        let result: Result<Vec<Value>, ApiError> = h.gateway.get("/products").await;

        assert!(result.is_ok());
        let sent = h.transport.last_request().unwrap();
        assert_eq!(sent.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_no_record_no_header() {
        let h = harness(None);
        h.transport.push_json(200, json!([]));
        let _: Vec<Value> = h.gateway.get("/categories").await.expect("ok response");
        assert_eq!(h.transport.last_request().unwrap().header("authorization"), None);
    }

    #[tokio::test]
    async fn test_invalid_header_token_sends_without_credentials() {
        let h = harness(Some(r#"{"token":"ab\ncd","username":"mya","role":"ADMIN"}"#));
        h.transport.push_json(200, json!([]));

        let result: Result<Vec<Value>, ApiError> = h.gateway.get("/products").await;

        assert!(result.is_ok());
        assert_eq!(h.transport.last_request().unwrap().header("authorization"), None);
    }

    struct UnreadableStorage;

    impl SessionStorage for UnreadableStorage {
        fn read(&self) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("permission denied"))
        }

        fn write(&self, _contents: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unreadable_storage_sends_without_credentials() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!([]));
        let gateway = Gateway::new("http://localhost:1500/api", transport.clone())
            .with_middleware(BearerAuth::new(Arc::new(UnreadableStorage)));

        let result: Result<Vec<Value>, ApiError> = gateway.get("/sales").await;

        assert!(result.is_ok());
        assert_eq!(transport.last_request().unwrap().header("authorization"), None);
    }

    #[tokio::test]
    async fn test_record_rewritten_elsewhere_is_picked_up() {
        let h = harness(None);
        h.session.set_session("first", "mya", UserRole::Admin);
        h.storage.replace(r#"{"token":"second","username":"mya","role":"ADMIN"}"#);
        h.transport.push_json(200, json!([]));

        let _: Vec<Value> = h.gateway.get("/sales").await.expect("ok response");

        assert_eq!(
            h.transport.last_request().unwrap().header("authorization"),
            Some("Bearer second")
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_redirects_once() {
        let h = harness(None);
        h.session.set_session("abc", "mya", UserRole::Admin);
        h.router.push("/app/sales").expect("navigate to sales");
        h.transport.push_raw(401, "");

        let err = h.gateway.get::<Vec<Value>>("/sales").await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!h.session.is_authenticated());
        let current = h.router.current();
        assert!(current.is(RouteName::Login));
        assert_eq!(current.query_value("redirect"), Some("/app/sales"));
        assert_eq!(
            h.router.history(),
            vec!["/app/sales", "/login?redirect=/app/sales"]
        );
    }

    #[tokio::test]
    async fn test_second_unauthorized_on_login_does_not_navigate() {
        let h = harness(None);
        h.session.set_session("abc", "mya", UserRole::Admin);
        h.router.push("/app/products").expect("navigate to products");
        h.transport.push_raw(401, "");
        h.transport.push_raw(401, "");

        let _ = h.gateway.get::<Vec<Value>>("/products").await;
        let history_after_first = h.router.history();

        // Something re-populated the session in between
        h.session.set_session("stale", "mya", UserRole::Admin);
        let _ = h.gateway.get::<Vec<Value>>("/products").await;

        assert!(!h.session.is_authenticated());
        assert_eq!(h.router.history(), history_after_first);
        assert_eq!(history_after_first.len(), 2);
    }

    #[tokio::test]
    async fn test_other_errors_leave_session_alone() {
        let h = harness(None);
        h.session.set_session("abc", "mya", UserRole::Admin);
        h.transport.push_raw(403, "forbidden");
        h.transport.push_raw(500, "boom");

        let first = h.gateway.get::<Value>("/reports/monthly").await.unwrap_err();
        let second = h.gateway.get::<Value>("/reports/monthly").await.unwrap_err();

        assert!(matches!(first, ApiError::AccessDenied(_)));
        assert!(matches!(second, ApiError::ServerError { status: 500, .. }));
        assert!(h.session.is_authenticated());
        assert!(h.router.history().is_empty());
    }
}
