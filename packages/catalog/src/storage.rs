// ABOUTME: Product storage layer using SQLite
// ABOUTME: Handles product CRUD and serves price/stock snapshots to order submission

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use storefront_core::{from_cents, to_cents, CatalogError, ProductCatalog, ProductSnapshot};
use storefront_storage::{is_unique_violation_on, StorageError};
use tracing::debug;

use crate::types::{Product, ProductCreateInput, ProductUpdateInput};

pub struct ProductStorage {
    pool: SqlitePool,
}

impl ProductStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List products, optionally including inactive ones
    pub async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>, StorageError> {
        let (products, _) = self
            .list_products_paginated(include_inactive, None, None)
            .await?;
        Ok(products)
    }

    pub async fn list_products_paginated(
        &self,
        include_inactive: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Product>, i64), StorageError> {
        debug!(
            "Fetching products (include_inactive: {}, limit: {:?}, offset: {:?})",
            include_inactive, limit, offset
        );

        let count_query = if include_inactive {
            "SELECT COUNT(*) FROM products"
        } else {
            "SELECT COUNT(*) FROM products WHERE is_active = 1"
        };

        let count: i64 = sqlx::query_scalar(count_query)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = if include_inactive {
            String::from("SELECT * FROM products ORDER BY name, id")
        } else {
            String::from("SELECT * FROM products WHERE is_active = 1 ORDER BY name, id")
        };

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
            if let Some(off) = offset {
                query.push_str(&format!(" OFFSET {}", off));
            }
        }

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let products = rows
            .iter()
            .map(|row| self.row_to_product(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((products, count))
    }

    /// Get a single product by ID
    pub async fn get_product(&self, product_id: &str) -> Result<Product, StorageError> {
        debug!("Fetching product: {}", product_id);

        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from_query)?;

        self.row_to_product(&row)
    }

    /// Create a new product
    pub async fn create_product(&self, input: ProductCreateInput) -> Result<Product, StorageError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StorageError::InvalidInput(
                "Product name is required".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(StorageError::InvalidInput(
                "Stock cannot be negative".to_string(),
            ));
        }
        let price_cents = price_to_cents(input.price)?;

        let product_id = input
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("prod-{}", nanoid::nanoid!()));
        let now = Utc::now();

        debug!("Creating product: {} (name: {})", product_id, name);

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, description, price_cents, stock, is_active,
                category_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product_id)
        .bind(name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(price_cents)
        .bind(input.stock)
        .bind(input.is_active.unwrap_or(true))
        .bind(&input.category_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "products.sku") {
                StorageError::Duplicate(input.sku.clone().unwrap_or_default())
            } else if is_unique_violation_on(&e, "products.id") {
                StorageError::Duplicate(product_id.clone())
            } else {
                StorageError::Sqlx(e)
            }
        })?;

        self.get_product(&product_id).await
    }

    /// Update a product's mutable fields
    pub async fn update_product(
        &self,
        product_id: &str,
        input: ProductUpdateInput,
    ) -> Result<Product, StorageError> {
        debug!("Updating product: {}", product_id);

        if matches!(input.stock, Some(stock) if stock < 0) {
            return Err(StorageError::InvalidInput(
                "Stock cannot be negative".to_string(),
            ));
        }
        let price_cents = input.price.map(price_to_cents).transpose()?;

        let mut query_parts = vec!["updated_at = ?"];
        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if price_cents.is_some() {
            query_parts.push("price_cents = ?");
        }
        if input.stock.is_some() {
            query_parts.push("stock = ?");
        }
        if input.is_active.is_some() {
            query_parts.push("is_active = ?");
        }

        let query_str = format!(
            "UPDATE products SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str).bind(Utc::now());

        // Bind parameters in the same order
        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(cents) = price_cents {
            query = query.bind(cents);
        }
        if let Some(stock) = input.stock {
            query = query.bind(stock);
        }
        if let Some(is_active) = input.is_active {
            query = query.bind(is_active);
        }

        let result = query
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_product(product_id).await
    }

    fn row_to_product(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Product, StorageError> {
        let price_cents: i64 = row.try_get("price_cents").map_err(StorageError::Sqlx)?;
        Ok(Product {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            name: row.try_get("name").map_err(StorageError::Sqlx)?,
            sku: row.try_get("sku").map_err(StorageError::Sqlx)?,
            description: row.try_get("description").map_err(StorageError::Sqlx)?,
            price: from_cents(price_cents),
            stock: row.try_get("stock").map_err(StorageError::Sqlx)?,
            is_active: row.try_get("is_active").map_err(StorageError::Sqlx)?,
            category_id: row.try_get("category_id").map_err(StorageError::Sqlx)?,
            created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
            updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
        })
    }
}

fn price_to_cents(price: Decimal) -> Result<i64, StorageError> {
    match to_cents(price) {
        Some(cents) if cents > 0 => Ok(cents),
        _ => Err(StorageError::InvalidInput(format!(
            "Invalid price: {}",
            price
        ))),
    }
}

fn lookup_error(err: StorageError) -> CatalogError {
    CatalogError::Lookup(err.to_string())
}

#[async_trait]
impl ProductCatalog for ProductStorage {
    async fn find_by_id(&self, product_id: &str) -> Result<Option<ProductSnapshot>, CatalogError> {
        match self.get_product(product_id).await {
            Ok(product) => Ok(Some(product.snapshot())),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(lookup_error(e)),
        }
    }

    async fn find_many(
        &self,
        product_ids: &[String],
    ) -> Result<HashMap<String, ProductSnapshot>, CatalogError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!("Fetching {} product snapshots", product_ids.len());

        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let query_str = format!("SELECT * FROM products WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&query_str);
        for id in product_ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| lookup_error(StorageError::Sqlx(e)))?;

        rows.iter()
            .map(|row| {
                self.row_to_product(row)
                    .map(|product| (product.id.clone(), product.snapshot()))
                    .map_err(lookup_error)
            })
            .collect()
    }
}
