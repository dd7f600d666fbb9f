//! The single outbound HTTP path for every API call.
//!
//! A `Gateway` owns the base URL, the default headers and an ordered list of
//! `Middleware` stages. Each request runs through every stage's
//! `on_request` hook before it is handed to the `Transport`; each response
//! runs through the `on_response` hooks in the same order until a stage
//! returns `Flow::Stop`. Non-success statuses are then mapped to `ApiError`
//! and returned to the caller untouched. Nothing here retries.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;

// ============================================================================
// Request / Response
// ============================================================================

/// An outgoing call before it reaches the transport. Paths are relative to
/// the gateway's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Header value as text, if present and printable
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Puts a prepared request on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by `reqwest`. No timeout is configured; the client's
/// defaults apply.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            ApiError::NetworkError(format!("{} {} failed: {}", request.method, url, e))
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ApiError::NetworkError(format!("Failed to read response body from {}: {}", url, e))
        })?;

        Ok(ApiResponse { status, body })
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Whether later response stages should still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A cross-cutting stage in the gateway pipeline. Both hooks are synchronous
/// and run in registration order.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    /// May rewrite the request before dispatch
    fn on_request(&self, _request: &mut ApiRequest) {}

    /// Sees every response the server sent, success or not
    fn on_response(&self, _request: &ApiRequest, _response: &ApiResponse) -> Flow {
        Flow::Continue
    }
}

// ============================================================================
// Gateway
// ============================================================================

pub struct Gateway {
    base_url: String,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers,
            transport,
            middleware: Vec::new(),
        }
    }

    /// Append a stage to the end of the pipeline
    pub fn with_middleware(mut self, stage: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(stage));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the pipeline stages, in order
    pub fn stages(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Generic entry point: method, path, optional JSON body, query params.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request.query = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.send(request).await
    }

    /// Run a request through the pipeline and the transport.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for (name, value) in &self.default_headers {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }

        for stage in &self.middleware {
            stage.on_request(&mut request);
        }

        let response = match self.transport.send(&self.base_url, &request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method, path = %request.path, error = %e, "Request failed");
                return Err(e);
            }
        };

        for stage in &self.middleware {
            if stage.on_response(&request, &response) == Flow::Stop {
                debug!(stage = stage.name(), "Response pipeline stopped early");
                break;
            }
        }

        if response.status.is_success() {
            Ok(response)
        } else {
            debug!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                body = %ApiError::truncate_body(&response.body),
                "Request returned error status"
            );
            Err(ApiError::from_status(response.status, &response.body))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, &[]).await?.json()
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, params).await?.json()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_json(body)?;
        self.request(Method::POST, path, Some(body), &[]).await?.json()
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_json(body)?;
        self.request(Method::PUT, path, Some(body), &[]).await?.json()
    }

    /// DELETE ignores whatever body the server sends back
    pub async fn delete(&self, path: &str, params: &[(&str, String)]) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None, params).await?;
        Ok(())
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;

    struct Tag(&'static str, Arc<Mutex<Vec<String>>>, Flow);

    impl Middleware for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn on_request(&self, request: &mut ApiRequest) {
            request.headers.insert("x-stage", HeaderValue::from_static(self.0));
            self.1.lock().unwrap().push(format!("req:{}", self.0));
        }

        fn on_response(&self, _request: &ApiRequest, _response: &ApiResponse) -> Flow {
            self.1.lock().unwrap().push(format!("resp:{}", self.0));
            self.2
        }
    }

    #[tokio::test]
    async fn test_default_headers_and_base_url() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!([]));
        let gateway = Gateway::new("http://localhost:1500/api/", transport.clone());
        assert_eq!(gateway.base_url(), "http://localhost:1500/api");

        let items: Vec<Value> = gateway.get("/products").await.expect("ok response");
        assert!(items.is_empty());

        let sent = transport.last_request().expect("request recorded");
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.path, "/products");
        assert_eq!(transport.base_urls(), vec!["http://localhost:1500/api".to_string()]);
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_can_stop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({}));
        let gateway = Gateway::new("http://api", transport.clone())
            .with_middleware(Tag("first", log.clone(), Flow::Stop))
            .with_middleware(Tag("second", log.clone(), Flow::Continue));

        let _: Value = gateway.get("/x").await.expect("ok response");

        assert_eq!(gateway.stages(), vec!["first", "second"]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["req:first", "req:second", "resp:first"]
        );
        // Later stages overwrite earlier request edits
        assert_eq!(transport.last_request().unwrap().header("x-stage"), Some("second"));
    }

    #[tokio::test]
    async fn test_error_status_passes_through() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(409, json!({"message": "SKU already exists"}));
        let gateway = Gateway::new("http://api", transport);

        let err = gateway
            .post::<Value, _>("/products", &json!({"sku": "GT-001"}))
            .await
            .unwrap_err();
        match err {
            ApiError::Rejected { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("SKU already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error_surfaces() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(ApiError::NetworkError("connection refused".into()));
        let gateway = Gateway::new("http://api", transport);

        let err = gateway.get::<Value>("/sales").await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_raw(200, "<html>gateway</html>");
        let gateway = Gateway::new("http://api", transport);

        let err = gateway.get::<Vec<Value>>("/products").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_request_carries_query_and_body() {
        let transport = Arc::new(MockTransport::new());
        transport.push_raw(204, "");
        let gateway = Gateway::new("http://api", transport.clone());

        gateway
            .delete("/categories/4", &[("hardDelete", "true".to_string())])
            .await
            .expect("delete succeeds");

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.query, vec![("hardDelete".to_string(), "true".to_string())]);
        assert!(sent.body.is_none());
    }
}
