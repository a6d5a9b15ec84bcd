// ABOUTME: Shared fixtures for order integration tests
// ABOUTME: Seeds catalog products and users and builds valid checkout submissions

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use storefront_catalog::{ProductCreateInput, ProductStorage};
use storefront_core::{LineItemInput, OrderSubmission, OrderValidator, PricingPolicy};
use storefront_orders::OrderWriter;
use storefront_storage::{open_database_at, open_in_memory, DatabaseOptions};

pub async fn setup_memory_db() -> SqlitePool {
    open_in_memory().await.unwrap()
}

pub async fn setup_file_db(path: &Path) -> SqlitePool {
    open_database_at(path, &DatabaseOptions::default())
        .await
        .unwrap()
}

/// Dollars and cents as a two-place decimal
pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub async fn seed_product(pool: &SqlitePool, id: &str, price_cents: i64, stock: i64) {
    ProductStorage::new(pool.clone())
        .create_product(ProductCreateInput {
            id: Some(id.to_string()),
            name: format!("Product {}", id),
            sku: Some(format!("SKU-{}", id)),
            price: money(price_cents),
            stock,
            ..ProductCreateInput::default()
        })
        .await
        .unwrap();
}

pub async fn product_stock(pool: &SqlitePool, id: &str) -> i64 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn order_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn writer(pool: &SqlitePool) -> OrderWriter {
    writer_with_policy(pool, PricingPolicy::default())
}

pub fn writer_with_policy(pool: &SqlitePool, policy: PricingPolicy) -> OrderWriter {
    OrderWriter::new(
        pool.clone(),
        Arc::new(ProductStorage::new(pool.clone())),
        OrderValidator::new(policy),
    )
}

/// A valid cash-on-delivery submission for `(product id, quantity, unit price cents)` lines
pub fn submission(email: &str, lines: &[(&str, i64, i64)]) -> OrderSubmission {
    let items: Vec<LineItemInput> = lines
        .iter()
        .map(|(product_id, quantity, price_cents)| LineItemInput {
            product_id: product_id.to_string(),
            quantity: *quantity,
            price: money(*price_cents),
            total: Some(money(price_cents * quantity)),
        })
        .collect();
    let total = lines
        .iter()
        .map(|(_, quantity, price_cents)| money(price_cents * quantity))
        .sum();

    OrderSubmission {
        order_id: None,
        customer_name: "Ada Lovelace".to_string(),
        customer_email: email.to_string(),
        customer_phone: "+1 415 555 0100".to_string(),
        shipping_address: "12 Analytical Row".to_string(),
        shipping_city: "London".to_string(),
        shipping_state: "Greater London".to_string(),
        shipping_postal_code: Some("NW1 6XE".to_string()),
        payment_method: "cash-on-delivery".to_string(),
        notes: None,
        items,
        total: Some(total),
    }
}
