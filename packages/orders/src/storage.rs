// ABOUTME: Order read side: lookups, filtered listing, customer history and guest-order linking
// ABOUTME: Maps order and order-item rows back into domain types

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use storefront_core::{from_cents, CustomerIdentity, Order, OrderItem, OrderStatus};
use tracing::{debug, info};

use crate::error::OrderError;

/// Criteria for listing orders; every set field must match
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the order number or an item's product name, SKU or id
    pub search: Option<String>,
}

/// Order ids bound per item lookup, well under SQLite's host parameter limit
pub const ITEM_LOOKUP_BATCH: usize = 500;

#[derive(Clone)]
pub struct OrderStorage {
    pool: SqlitePool,
    item_batch: usize,
}

impl OrderStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            item_batch: ITEM_LOOKUP_BATCH,
        }
    }

    /// Override how many order ids one item lookup binds
    pub fn with_item_batch_size(mut self, size: usize) -> Self {
        self.item_batch = size.max(1);
        self
    }

    /// Get a single order with its items
    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        debug!("Fetching order: {}", order_id);

        let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        self.hydrate_one(&row).await
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> Result<Order, OrderError> {
        debug!("Fetching order by number: {}", order_number);

        let row = sqlx::query("SELECT * FROM orders WHERE order_number = ?")
            .bind(order_number.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_number.to_string()))?;

        self.hydrate_one(&row).await
    }

    /// Find the order created by an earlier attempt carrying the same client token
    pub async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query("SELECT * FROM orders WHERE idempotency_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(self.hydrate_one(&r).await?)),
            None => Ok(None),
        }
    }

    /// List orders matching `filter`, newest first, with the total match count
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Order>, i64), OrderError> {
        debug!(
            "Fetching orders (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(user_id) = &filter.user_id {
            clauses.push("o.user_id = ?");
            binds.push(user_id.clone());
        }
        if let Some(email) = &filter.email {
            clauses.push("o.customer_email = ? COLLATE NOCASE");
            binds.push(email.trim().to_string());
        }
        if let Some(status) = filter.status {
            clauses.push("o.status = ?");
            binds.push(status.as_str().to_string());
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push(
                r#"(o.order_number LIKE ? ESCAPE '\'
                   OR EXISTS (
                       SELECT 1 FROM order_items i
                       WHERE i.order_id = o.id
                       AND (i.product_name LIKE ? ESCAPE '\'
                            OR i.product_sku LIKE ? ESCAPE '\'
                            OR i.product_id LIKE ? ESCAPE '\')
                   ))"#,
            );
            let pattern = like_pattern(search);
            binds.extend(std::iter::repeat(pattern).take(4));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM orders o{}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for value in &binds {
            count = count.bind(value);
        }
        let total = count.fetch_one(&self.pool).await?;

        let mut query_str = format!(
            "SELECT o.* FROM orders o{} ORDER BY o.created_at DESC, o.rowid DESC",
            where_clause
        );
        if let Some(lim) = limit {
            query_str.push_str(&format!(" LIMIT {}", lim));
            if let Some(off) = offset {
                query_str.push_str(&format!(" OFFSET {}", off));
            }
        }

        let mut query = sqlx::query(&query_str);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok((self.hydrate_many(&rows).await?, total))
    }

    /// Attach guest orders to a user account whose email matches.
    ///
    /// Uses the account's own email, not a caller-supplied one. Orders already
    /// linked to any user are left alone, so running it again is a no-op.
    /// Returns the number of orders newly linked.
    pub async fn link_orders_to_user(&self, user_id: &str) -> Result<u64, OrderError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET user_id = ?, updated_at = ?
            WHERE user_id IS NULL
            AND customer_email = (SELECT email FROM users WHERE id = ?) COLLATE NOCASE
            "#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let linked = result.rows_affected();
        if linked > 0 {
            info!("Linked {} guest order(s) to user {}", linked, user_id);
        }
        Ok(linked)
    }

    /// Order history for a customer.
    ///
    /// A signed-in user first has matching guest orders linked, then gets the
    /// orders referencing their id; when none do, orders placed under their
    /// email are returned instead. A guest gets the orders placed under their
    /// email.
    pub async fn get_orders_for_user(
        &self,
        identity: &CustomerIdentity,
    ) -> Result<Vec<Order>, OrderError> {
        if let Some(user_id) = &identity.user_id {
            self.link_orders_to_user(user_id).await?;

            let (orders, _) = self
                .list_orders(
                    &OrderFilter {
                        user_id: Some(user_id.clone()),
                        ..OrderFilter::default()
                    },
                    None,
                    None,
                )
                .await?;
            if !orders.is_empty() {
                return Ok(orders);
            }
        }

        match &identity.email {
            Some(email) if !email.trim().is_empty() => {
                let (orders, _) = self
                    .list_orders(
                        &OrderFilter {
                            email: Some(email.clone()),
                            ..OrderFilter::default()
                        },
                        None,
                        None,
                    )
                    .await?;
                Ok(orders)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn hydrate_one(&self, row: &SqliteRow) -> Result<Order, OrderError> {
        let mut orders = self.hydrate_many(std::slice::from_ref(row)).await?;
        orders
            .pop()
            .ok_or_else(|| OrderError::PersistenceFailed("order row vanished".to_string()))
    }

    /// Convert order rows and load their items, one query per batch of ids
    async fn hydrate_many(&self, rows: &[SqliteRow]) -> Result<Vec<Order>, OrderError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut item_rows = Vec::new();
        for batch in ids.chunks(self.item_batch) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let query_str = format!(
                "SELECT * FROM order_items WHERE order_id IN ({}) ORDER BY order_id, position",
                placeholders
            );
            let mut query = sqlx::query(&query_str);
            for id in batch {
                query = query.bind(id);
            }
            item_rows.extend(query.fetch_all(&self.pool).await?);
        }
        if ids.len() > self.item_batch {
            debug!(
                "Loaded items for {} orders in {} batches",
                ids.len(),
                ids.len().div_ceil(self.item_batch)
            );
        }

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item_row in &item_rows {
            let item = row_to_item(item_row)?;
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(item);
        }

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let items = items_by_order.remove(&id).unwrap_or_default();
                row_to_order(row, items)
            })
            .collect()
    }
}

fn row_to_order(row: &SqliteRow, items: Vec<OrderItem>) -> Result<Order, OrderError> {
    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        user_id: row.try_get("user_id")?,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        shipping_address: row.try_get("shipping_address")?,
        shipping_city: row.try_get("shipping_city")?,
        shipping_state: row.try_get("shipping_state")?,
        shipping_postal_code: row.try_get("shipping_postal_code")?,
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
        payment_method: row.try_get("payment_method")?,
        payment_status: row.try_get("payment_status")?,
        subtotal: from_cents(row.try_get("subtotal_cents")?),
        shipping_fee: from_cents(row.try_get("shipping_fee_cents")?),
        total: from_cents(row.try_get("total_cents")?),
        items,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<OrderItem, OrderError> {
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        product_sku: row.try_get("product_sku")?,
        quantity: row.try_get("quantity")?,
        price: from_cents(row.try_get("price_cents")?),
        total: from_cents(row.try_get("total_cents")?),
    })
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
