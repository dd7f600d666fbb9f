//! Typed façade over the gateway for the point-of-sale REST API.
//!
//! Each method is a direct mapping onto one endpoint. Errors come back
//! exactly as the gateway produced them.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, Gateway};
use crate::models::{
    CategoryDto, CategoryReportDto, CustomerReportDto, DailySalesSummaryDto, JwtAuthResponse,
    LoginRequest, MonthlySalesReport, ProductDto, RegisterRequest, SaleRequestDto,
    SaleResponseDto,
};

/// Date format the report endpoints expect
const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Clone is cheap - the gateway is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<Gateway>,
}

impl ApiClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    // ===== Auth =====

    pub async fn register(&self, payload: &RegisterRequest) -> Result<JwtAuthResponse, ApiError> {
        self.gateway.post("/auth/register", payload).await
    }

    pub async fn login(&self, payload: &LoginRequest) -> Result<JwtAuthResponse, ApiError> {
        self.gateway.post("/auth/login", payload).await
    }

    // ===== Products =====

    pub async fn list_products(&self) -> Result<Vec<ProductDto>, ApiError> {
        self.gateway.get("/products").await
    }

    pub async fn get_product(&self, id: i64) -> Result<ProductDto, ApiError> {
        self.gateway.get(&format!("/products/{}", id)).await
    }

    pub async fn create_product(&self, product: &ProductDto) -> Result<ProductDto, ApiError> {
        self.gateway.post("/products", &without_id(product)?).await
    }

    pub async fn update_product(&self, id: i64, product: &ProductDto) -> Result<ProductDto, ApiError> {
        self.gateway
            .put(&format!("/products/{}", id), &without_id(product)?)
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.gateway.delete(&format!("/products/{}", id), &[]).await
    }

    // ===== Categories =====

    pub async fn list_categories(&self) -> Result<Vec<CategoryDto>, ApiError> {
        self.gateway.get("/categories").await
    }

    pub async fn get_category(&self, id: i64) -> Result<CategoryDto, ApiError> {
        self.gateway.get(&format!("/categories/{}", id)).await
    }

    pub async fn create_category(&self, category: &CategoryDto) -> Result<CategoryDto, ApiError> {
        self.gateway.post("/categories", &without_id(category)?).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        category: &CategoryDto,
    ) -> Result<CategoryDto, ApiError> {
        self.gateway
            .put(&format!("/categories/{}", id), &without_id(category)?)
            .await
    }

    /// Soft delete unless `hard_delete` is set
    pub async fn delete_category(&self, id: i64, hard_delete: bool) -> Result<(), ApiError> {
        self.gateway
            .delete(
                &format!("/categories/{}", id),
                &[("hardDelete", hard_delete.to_string())],
            )
            .await
    }

    // ===== Sales =====

    pub async fn list_sales(&self) -> Result<Vec<SaleResponseDto>, ApiError> {
        self.gateway.get("/sales").await
    }

    pub async fn get_sale(&self, id: i64) -> Result<SaleResponseDto, ApiError> {
        self.gateway.get(&format!("/sales/{}", id)).await
    }

    pub async fn create_sale(&self, sale: &SaleRequestDto) -> Result<SaleResponseDto, ApiError> {
        self.gateway.post("/sales", sale).await
    }

    // ===== Reports =====

    pub async fn monthly_report(&self, year: i32) -> Result<Vec<MonthlySalesReport>, ApiError> {
        self.gateway
            .get_with_query("/reports/monthly", &[("year", year.to_string())])
            .await
    }

    /// `month` is passed through as given (e.g. `2024-05`)
    pub async fn daily_report(&self, month: &str) -> Result<Vec<DailySalesSummaryDto>, ApiError> {
        self.gateway
            .get_with_query("/reports/daily", &[("month", month.to_string())])
            .await
    }

    pub async fn category_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryReportDto>, ApiError> {
        self.gateway
            .get_with_query("/reports/category", &date_range(start, end))
            .await
    }

    pub async fn customer_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CustomerReportDto>, ApiError> {
        self.gateway
            .get_with_query("/reports/customer", &date_range(start, end))
            .await
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 2] {
    [
        ("startDate", start.format(REPORT_DATE_FORMAT).to_string()),
        ("endDate", end.format(REPORT_DATE_FORMAT).to_string()),
    ]
}

/// Serialize an entity with its `id` removed; the server owns identity.
fn without_id<T: Serialize>(entity: &T) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(entity)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize entity: {}", e)))?;
    if let Value::Object(ref mut map) = value {
        map.remove("id");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;

    fn client() -> (Arc<MockTransport>, ApiClient) {
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(Gateway::new("http://api", transport.clone()));
        (transport, client)
    }

    fn green_tea(id: Option<i64>) -> ProductDto {
        ProductDto {
            id,
            name: "Green Tea".to_string(),
            sku: "GT-001".to_string(),
            description: None,
            cost_price: 800.0,
            selling_price: 1250.0,
            quantity: 40,
            category_id: 2,
        }
    }

    #[test]
    fn test_without_id() {
        let body = without_id(&green_tea(Some(7))).expect("serializable");
        assert!(body.get("id").is_none());
        assert_eq!(body["sku"], "GT-001");
        assert_eq!(body["sellingPrice"], 1250.0);
    }

    #[tokio::test]
    async fn test_create_and_update_strip_id() {
        let (transport, client) = client();
        transport.push_json(201, json!({"id": 9, "name": "Green Tea", "sku": "GT-001", "costPrice": 800, "sellingPrice": 1250, "quantity": 40, "categoryId": 2}));
        transport.push_json(200, json!({"id": 9, "name": "Green Tea", "sku": "GT-001", "costPrice": 800, "sellingPrice": 1250, "quantity": 40, "categoryId": 2}));
        transport.push_json(201, json!({"id": 3, "name": "Drinks"}));
        transport.push_json(200, json!({"id": 3, "name": "Drinks"}));

        let created = client.create_product(&green_tea(Some(99))).await.expect("created");
        assert_eq!(created.id, Some(9));
        client.update_product(9, &green_tea(Some(99))).await.expect("updated");
        let drinks = CategoryDto { id: Some(3), name: "Drinks".to_string(), description: None };
        client.create_category(&drinks).await.expect("created");
        client.update_category(3, &drinks).await.expect("updated");

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        for request in &requests {
            let body = request.body.as_ref().expect("body sent");
            assert!(body.get("id").is_none(), "id leaked into {}", request.path);
        }
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].path, "/products/9");
        assert_eq!(requests[3].path, "/categories/3");
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let (transport, client) = client();
        transport.push_raw(404, "Product not found with id 5");

        let err = client.get_product(5).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref body) if body.contains("id 5")));
    }

    #[tokio::test]
    async fn test_delete_category_sends_hard_delete_flag() {
        let (transport, client) = client();
        transport.push_raw(204, "");
        transport.push_raw(204, "");

        client.delete_category(4, false).await.expect("soft delete");
        client.delete_category(4, true).await.expect("hard delete");

        let requests = transport.requests();
        assert_eq!(requests[0].query, vec![("hardDelete".to_string(), "false".to_string())]);
        assert_eq!(requests[1].query, vec![("hardDelete".to_string(), "true".to_string())]);
        assert_eq!(requests[1].method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_report_queries() {
        let (transport, client) = client();
        transport.push_json(200, json!([]));
        transport.push_json(200, json!([]));
        transport.push_json(200, json!([]));
        transport.push_json(200, json!([]));

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        client.monthly_report(2024).await.expect("monthly");
        client.daily_report("2024-05").await.expect("daily");
        client.category_report(start, end).await.expect("category");
        client.customer_report(start, end).await.expect("customer");

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/reports/monthly");
        assert_eq!(requests[0].query, vec![("year".to_string(), "2024".to_string())]);
        assert_eq!(requests[1].query, vec![("month".to_string(), "2024-05".to_string())]);
        assert_eq!(requests[2].path, "/reports/category");
        assert_eq!(
            requests[3].query,
            vec![
                ("startDate".to_string(), "2024-01-01".to_string()),
                ("endDate".to_string(), "2024-03-31".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (transport, client) = client();
        transport.push_json(200, json!({"token": "abc", "username": "mya", "role": "ADMIN"}));

        let resp = client
            .login(&LoginRequest::new("mya", "secret"))
            .await
            .expect("login ok");
        assert_eq!(resp.token, "abc");

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.path, "/auth/login");
        assert_eq!(sent.body, Some(json!({"username": "mya", "password": "secret"})));
    }
}
