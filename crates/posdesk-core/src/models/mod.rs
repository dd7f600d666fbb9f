//! Data transfer shapes exchanged with the point-of-sale API.
//!
//! - `LoginRequest`, `RegisterRequest`, `JwtAuthResponse`, `UserRole`: authentication
//! - `ProductDto`, `CategoryDto`: inventory entities
//! - `SaleRequestDto`, `SaleResponseDto` and their line/payment types: sales
//! - Report rows: `MonthlySalesReport`, `DailySalesSummaryDto`, `CategoryReportDto`,
//!   `CustomerReportDto`

pub mod auth;
pub mod category;
pub mod product;
pub mod report;
pub mod sale;

pub use auth::{JwtAuthResponse, LoginRequest, RegisterRequest, UserRole};
pub use category::CategoryDto;
pub use product::{ProductDto, ProductResponseDto};
pub use report::{CategoryReportDto, CustomerReportDto, DailySalesSummaryDto, MonthlySalesReport};
pub use sale::{
    PaymentDto, PaymentMethod, PaymentResponseDto, SaleItemDto, SaleItemResponseDto,
    SaleRequestDto, SaleResponseDto, UserResponseDto,
};
