use serde::{Deserialize, Serialize};

/// Product as listed and edited on the inventory screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost_price: f64,
    pub selling_price: f64,
    pub quantity: i64,
    pub category_id: i64,
}

impl ProductDto {
    /// Display name, falling back to the id when the name is blank
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        match self.id {
            Some(id) => format!("Product {}", id),
            None => "Product".to_string(),
        }
    }
}

/// Product summary embedded in sale line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponseDto {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub selling_price: f64,
    pub category_name: String,
}
