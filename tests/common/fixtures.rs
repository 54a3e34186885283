//! Entity catalogues and response bodies used across harnesses.
//!
//! Sizes are chosen around the default local threshold (20): `warehouses`
//! and `branches` mount local, `suppliers(25)` and `product_catalogue`
//! mount remote.

use serde_json::{json, Value};
use shelf_core::Entity;

/// Five warehouses: always filtered locally.
pub fn warehouses() -> Vec<Entity> {
    vec![
        Entity::new(1u64, "Main Warehouse").with_code("WH-1").with_category("Moscow"),
        Entity::new(2u64, "North Depot").with_code("WH-2").with_category("Tver"),
        Entity::new(3u64, "South Depot").with_code("WH-3").with_category("Tula"),
        Entity::new(4u64, "Tyre Storage").with_code("WH-4").with_category("Moscow"),
        Entity::new(5u64, "Returns Bay").with_code("WH-5").with_category("Moscow"),
    ]
}

/// Exactly `n` branches named "Branch 01".."Branch n".
pub fn branches(n: usize) -> Vec<Entity> {
    (1..=n)
        .map(|i| Entity::new(i as u64, format!("Branch {i:02}")).with_code(format!("BR-{i:03}")))
        .collect()
}

/// `n` suppliers named "Supplier 01".. with codes "SUP-001"..; no name or
/// code contains "ab".
pub fn suppliers(n: usize) -> Vec<Entity> {
    (1..=n)
        .map(|i| {
            Entity::new(i as u64, format!("Supplier {i:02}"))
                .with_code(format!("SUP-{i:03}"))
                .with_secondary(format!("+7 900 000 {i:04}"))
        })
        .collect()
}

/// A product catalogue of `n` items with deterministic prices, stock and
/// barcodes. Every third product is out of stock.
pub fn product_catalogue(n: usize) -> Vec<Entity> {
    const NAMES: &[&str] = &[
        "Brake pads",
        "Brake disc",
        "Oil filter",
        "Air filter",
        "Spark plug",
        "Wiper blade",
        "Timing belt",
        "Coolant",
        "Headlight bulb",
        "Bolt M8",
    ];
    (0..n)
        .map(|i| {
            Entity::new(
                (i + 1) as u64,
                format!("{} #{}", NAMES[i % NAMES.len()], i / NAMES.len() + 1),
            )
            .with_code(format!("SKU-{:05}", i + 1))
            .with_secondary(format!("4601234{:06}", i + 1))
            .with_category(if i % 2 == 0 { "Brakes" } else { "Engine" })
            .with_price(100.0 + (i % 50) as f64 * 10.5)
            .with_stock(if i % 3 == 0 { 0.0 } else { (i % 17) as f64 + 1.0 })
        })
        .collect()
}

/// Products as the search endpoint returns them (backend field names).
pub fn product_records() -> Vec<Value> {
    vec![
        json!({"id": 101, "name": "Brake pads front", "sku": "BP-F", "barcode": "4601234567890",
               "category_name": "Brakes", "price": "2490.00", "stock": "12.000"}),
        json!({"id": 102, "name": "Brake pads rear", "sku": "BP-R", "barcode": "4601234567891",
               "category_name": "Brakes", "price": 1990, "stock": 0}),
        json!({"id": 103, "name": "Oil filter", "sku": "OF-22", "barcode": "4601234500001",
               "category_name": "Filters", "price": 450.5, "stock": 40}),
        json!({"id": "104", "title": "Bolt M8", "code": "BM8", "ean": "4600000000008",
               "retail_price": 12, "qty": 1000}),
    ]
}

pub fn customer_records() -> Vec<Value> {
    vec![
        json!({"id": 1, "full_name": "Jane Roe", "phone": "+7 900 123 4567", "group_name": "Retail"}),
        json!({"id": 2, "company_name": "Roe & Sons", "tax_id": "7701234567", "email": "info@roe.example"}),
        json!({"id": 3, "name": "Ivan Petrov", "mobile": "+7 901 765 4321"}),
    ]
}

/// Candidate file body in the `{"data": [...]}` envelope shape.
pub fn candidates_file(records: &[Value]) -> String {
    serde_json::to_string_pretty(&json!({ "data": records })).unwrap()
}
