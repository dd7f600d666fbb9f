use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalesReport {
    pub month: String,
    pub year: i32,
    pub month_of_year: u32,
    pub total_sales_count: i64,
    pub total_items_sold: i64,
    pub total_discount: f64,
    pub total_revenue: f64,
    pub net_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesSummaryDto {
    pub sale_date: String,
    pub total_amount: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReportDto {
    pub customer_id: i64,
    pub customer_name: String,
    pub total_sales: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReportDto {
    pub category_name: String,
    pub total_quantity_sold: i64,
    pub total_amount: f64,
}
