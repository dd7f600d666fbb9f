use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub amount: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDto {
    pub product_id: i64,
    pub quantity: i64,
}

/// Body of `POST /sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequestDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub items: Vec<SaleItemDto>,
    pub payments: Vec<PaymentDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponseDto {
    pub id: i64,
    pub payment_date: String,
    pub amount: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemResponseDto {
    pub id: i64,
    pub product: super::ProductResponseDto,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// User as embedded in a sale. The role is a free-form string here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponseDto {
    pub id: i64,
    pub invoice_number: String,
    pub sale_date: String,
    pub total_amount: f64,
    pub discount: f64,
    pub net_amount: f64,
    pub user: UserResponseDto,
    pub sale_items: Vec<SaleItemResponseDto>,
    pub payments: Vec<PaymentResponseDto>,
}

impl SaleResponseDto {
    pub fn item_count(&self) -> i64 {
        self.sale_items.iter().map(|i| i.quantity).sum()
    }
}
