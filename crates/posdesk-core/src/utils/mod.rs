//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{category_name, format_currency, format_date, truncate_string};
