//! Test transport: records every request and replays queued responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::gateway::{ApiRequest, ApiResponse, Transport};
use super::ApiError;

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<(String, ApiRequest)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, body.to_string());
    }

    pub fn push_raw(&self, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().map(|(_, r)| r.clone())
    }

    pub fn base_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(base, _)| base.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((base_url.to_string(), request.clone()));

        // Unscripted calls look like a missing route
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(StatusCode::NOT_FOUND, "Not Found")))
    }
}
