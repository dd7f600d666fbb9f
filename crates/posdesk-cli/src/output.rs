//! Plain-text tables for the terminal.

use posdesk_core::models::{
    CategoryDto, CategoryReportDto, CustomerReportDto, DailySalesSummaryDto, MonthlySalesReport,
    ProductDto, SaleResponseDto,
};
use posdesk_core::utils::{category_name, format_currency, format_date, truncate_string};

const NAME_WIDTH: usize = 28;

fn id_cell(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_products(products: &[ProductDto], categories: &[CategoryDto]) {
    if products.is_empty() {
        println!("No products");
        return;
    }
    println!(
        "{:>5}  {:<28}  {:<12}  {:<16}  {:>16}  {:>6}",
        "ID", "NAME", "SKU", "CATEGORY", "PRICE", "QTY"
    );
    for p in products {
        println!(
            "{:>5}  {:<28}  {:<12}  {:<16}  {:>16}  {:>6}",
            id_cell(p.id),
            truncate_string(&p.display_name(), NAME_WIDTH),
            truncate_string(&p.sku, 12),
            truncate_string(category_name(categories, p.category_id), 16),
            format_currency(p.selling_price),
            p.quantity,
        );
    }
}

pub fn print_product(product: &ProductDto, categories: &[CategoryDto]) {
    println!("ID:          {}", id_cell(product.id));
    println!("Name:        {}", product.display_name());
    println!("SKU:         {}", product.sku);
    println!("Category:    {}", category_name(categories, product.category_id));
    println!("Cost:        {}", format_currency(product.cost_price));
    println!("Price:       {}", format_currency(product.selling_price));
    println!("In stock:    {}", product.quantity);
    if let Some(ref description) = product.description {
        println!("Description: {}", description);
    }
}

pub fn print_categories(categories: &[CategoryDto]) {
    if categories.is_empty() {
        println!("No categories");
        return;
    }
    println!("{:>5}  {:<24}  DESCRIPTION", "ID", "NAME");
    for c in categories {
        println!(
            "{:>5}  {:<24}  {}",
            id_cell(c.id),
            truncate_string(&c.name, 24),
            truncate_string(c.description.as_deref().unwrap_or(""), 40),
        );
    }
}

pub fn print_sales(sales: &[SaleResponseDto]) {
    if sales.is_empty() {
        println!("No sales");
        return;
    }
    println!(
        "{:>5}  {:<16}  {:<12}  {:<14}  {:>5}  {:>16}",
        "ID", "INVOICE", "DATE", "CASHIER", "ITEMS", "NET"
    );
    for s in sales {
        println!(
            "{:>5}  {:<16}  {:<12}  {:<14}  {:>5}  {:>16}",
            s.id,
            truncate_string(&s.invoice_number, 16),
            format_date(&s.sale_date),
            truncate_string(&s.user.username, 14),
            s.item_count(),
            format_currency(s.net_amount),
        );
    }
}

pub fn print_sale(sale: &SaleResponseDto) {
    println!("Invoice {} ({})", sale.invoice_number, format_date(&sale.sale_date));
    println!("Cashier: {}", sale.user.username);
    println!();
    for item in &sale.sale_items {
        println!(
            "  {:<28}  {:>4} x {:>14}  {:>16}",
            truncate_string(&item.product.name, NAME_WIDTH),
            item.quantity,
            format_currency(item.unit_price),
            format_currency(item.total_price),
        );
    }
    println!();
    println!("  Total:    {:>16}", format_currency(sale.total_amount));
    println!("  Discount: {:>16}", format_currency(sale.discount));
    println!("  Net:      {:>16}", format_currency(sale.net_amount));
    for payment in &sale.payments {
        println!("  Paid {:?}: {}", payment.method, format_currency(payment.amount));
    }
}

pub fn print_monthly(rows: &[MonthlySalesReport]) {
    if rows.is_empty() {
        println!("No sales for this year");
        return;
    }
    println!(
        "{:<10}  {:>6}  {:>6}  {:>16}  {:>16}",
        "MONTH", "SALES", "ITEMS", "REVENUE", "NET"
    );
    for r in rows {
        println!(
            "{:<10}  {:>6}  {:>6}  {:>16}  {:>16}",
            r.month,
            r.total_sales_count,
            r.total_items_sold,
            format_currency(r.total_revenue),
            format_currency(r.net_revenue),
        );
    }
}

pub fn print_daily(rows: &[DailySalesSummaryDto]) {
    if rows.is_empty() {
        println!("No sales for this month");
        return;
    }
    println!("{:<12}  {:>6}  {:>16}", "DATE", "SALES", "AMOUNT");
    for r in rows {
        println!(
            "{:<12}  {:>6}  {:>16}",
            format_date(&r.sale_date),
            r.total_sales,
            format_currency(r.total_amount),
        );
    }
}

pub fn print_category_report(rows: &[CategoryReportDto]) {
    if rows.is_empty() {
        println!("No sales in this range");
        return;
    }
    println!("{:<24}  {:>8}  {:>16}", "CATEGORY", "QTY", "AMOUNT");
    for r in rows {
        println!(
            "{:<24}  {:>8}  {:>16}",
            truncate_string(&r.category_name, 24),
            r.total_quantity_sold,
            format_currency(r.total_amount),
        );
    }
}

pub fn print_customer_report(rows: &[CustomerReportDto]) {
    if rows.is_empty() {
        println!("No sales in this range");
        return;
    }
    println!("{:>5}  {:<24}  {:>6}  {:>16}", "ID", "CUSTOMER", "SALES", "AMOUNT");
    for r in rows {
        println!(
            "{:>5}  {:<24}  {:>6}  {:>16}",
            r.customer_id,
            truncate_string(&r.customer_name, 24),
            r.total_sales,
            format_currency(r.total_amount),
        );
    }
}
