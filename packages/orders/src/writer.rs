// ABOUTME: Order submission: validation against catalog snapshots and the all-or-nothing persistence unit
// ABOUTME: Inserts the order and its items and decrements stock in one transaction, deduplicating retries

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use storefront_core::{
    generate_order_number, to_cents, CustomerIdentity, Order, OrderDraft, OrderStatus,
    OrderSubmission, OrderValidator, PaymentStatus, ProductCatalog, ValidationError,
};
use storefront_storage::is_unique_violation_on;
use tracing::{debug, error, info, warn};

use crate::error::OrderError;
use crate::storage::OrderStorage;

/// Attempts at finding a free order number before giving up
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// What the checkout UI gets back after a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub order_number: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// True when this submission repeated an already persisted attempt
    pub duplicate: bool,
}

impl OrderReceipt {
    fn for_existing(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            duplicate: true,
        }
    }
}

enum InsertOutcome {
    Inserted,
    NumberTaken,
    AlreadySubmitted,
}

pub struct OrderWriter {
    pool: SqlitePool,
    catalog: Arc<dyn ProductCatalog>,
    validator: OrderValidator,
    orders: OrderStorage,
}

impl OrderWriter {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn ProductCatalog>, validator: OrderValidator) -> Self {
        let orders = OrderStorage::new(pool.clone());
        Self {
            pool,
            catalog,
            validator,
            orders,
        }
    }

    pub fn validator(&self) -> &OrderValidator {
        &self.validator
    }

    /// Validate a submission and persist it.
    ///
    /// A submission whose `orderId` token was already persisted returns the
    /// existing order's receipt instead of creating a second order.
    pub async fn submit(
        &self,
        submission: &OrderSubmission,
        identity: &CustomerIdentity,
    ) -> Result<OrderReceipt, OrderError> {
        // Checked before validation: stock has already moved for a persisted attempt
        if let Some(key) = idempotency_key(submission) {
            if let Some(existing) = self.orders.find_by_idempotency_key(&key).await? {
                info!(
                    "Order token {} already persisted as {}",
                    key, existing.order_number
                );
                return Ok(OrderReceipt::for_existing(&existing));
            }
        }

        let mut product_ids: Vec<String> = Vec::new();
        for item in &submission.items {
            let id = item.product_id.trim();
            if !id.is_empty() && !product_ids.iter().any(|p| p == id) {
                product_ids.push(id.to_string());
            }
        }
        let snapshots = self.catalog.find_many(&product_ids).await?;

        let draft = self
            .validator
            .validate(submission, &snapshots)
            .map_err(rejection)?;

        self.persist(&draft, identity).await
    }

    /// Run the persistence unit for an already validated draft
    pub async fn persist(
        &self,
        draft: &OrderDraft,
        identity: &CustomerIdentity,
    ) -> Result<OrderReceipt, OrderError> {
        let payment_status = draft.payment_method.initial_payment_status();

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_id = format!("ord-{}", nanoid::nanoid!());
            let order_number = generate_order_number();

            // The order INSERT is the first statement so the transaction takes the write lock up front
            let mut tx = self.pool.begin().await?;

            match insert_order(&mut tx, &order_id, &order_number, draft, identity, payment_status)
                .await?
            {
                InsertOutcome::Inserted => {}
                InsertOutcome::NumberTaken => {
                    tx.rollback().await?;
                    warn!(
                        "Order number {} already taken (attempt {}/{})",
                        order_number, attempt, MAX_ORDER_NUMBER_ATTEMPTS
                    );
                    continue;
                }
                InsertOutcome::AlreadySubmitted => {
                    tx.rollback().await?;
                    return self.existing_receipt(draft).await;
                }
            }

            for (product_id, quantity) in requested_quantities(draft) {
                if let Err(e) = reserve_stock(&mut tx, &product_id, quantity).await {
                    tx.rollback().await?;
                    warn!("Order {} rolled back: {}", order_number, e);
                    return Err(e);
                }
            }

            for (position, line) in draft.lines.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO order_items (
                        id, order_id, product_id, product_name, product_sku,
                        quantity, price_cents, total_cents, position
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(format!("item-{}", nanoid::nanoid!()))
                .bind(&order_id)
                .bind(&line.product_id)
                .bind(&line.product_name)
                .bind(&line.product_sku)
                .bind(line.quantity)
                .bind(cents(line.unit_price)?)
                .bind(cents(line.total)?)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to insert item for order {}: {}", order_number, e);
                    OrderError::from(e)
                })?;
            }

            tx.commit().await.map_err(|e| {
                error!("Failed to commit order {}: {}", order_number, e);
                OrderError::from(e)
            })?;

            info!(
                "Created order {} ({} item(s), total {})",
                order_number,
                draft.lines.len(),
                draft.total
            );

            return Ok(OrderReceipt {
                order_id,
                order_number,
                total: draft.total,
                status: OrderStatus::Pending,
                payment_status,
                duplicate: false,
            });
        }

        error!(
            "Could not allocate a unique order number after {} attempts",
            MAX_ORDER_NUMBER_ATTEMPTS
        );
        Err(OrderError::PersistenceFailed(
            "could not allocate a unique order number".to_string(),
        ))
    }

    /// Receipt for a concurrent attempt that won the race on the same token
    async fn existing_receipt(&self, draft: &OrderDraft) -> Result<OrderReceipt, OrderError> {
        let key = draft.idempotency_key.as_deref().unwrap_or_default();
        let existing = self
            .orders
            .find_by_idempotency_key(key)
            .await?
            .ok_or_else(|| {
                OrderError::PersistenceFailed(format!("order token {} vanished", key))
            })?;
        info!(
            "Concurrent submission of token {} resolved to {}",
            key, existing.order_number
        );
        Ok(OrderReceipt::for_existing(&existing))
    }
}

/// A submission whose only problem is stock is a data conflict, not a form error
fn rejection(errors: Vec<ValidationError>) -> OrderError {
    warn!(
        "Rejected order submission with {} validation error(s)",
        errors.len()
    );
    if errors.iter().all(|e| e.stock_shortage.is_some()) {
        if let Some(shortage) = errors.iter().find_map(|e| e.stock_shortage.clone()) {
            return OrderError::InsufficientStock {
                product_id: shortage.product_id,
                product_name: shortage.product_name,
                requested: shortage.requested,
                available: shortage.available,
            };
        }
    }
    OrderError::ValidationFailed(errors)
}

fn idempotency_key(submission: &OrderSubmission) -> Option<String> {
    submission
        .order_id
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn cents(amount: Decimal) -> Result<i64, OrderError> {
    to_cents(amount)
        .ok_or_else(|| OrderError::PersistenceFailed(format!("amount out of range: {}", amount)))
}

/// Quantity per product across all lines, in first-seen order
fn requested_quantities(draft: &OrderDraft) -> Vec<(String, i64)> {
    let mut totals: Vec<(String, i64)> = Vec::new();
    for line in &draft.lines {
        match totals.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(line.quantity),
            None => totals.push((line.product_id.clone(), line.quantity)),
        }
    }
    totals
}

async fn insert_order(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: &str,
    order_number: &str,
    draft: &OrderDraft,
    identity: &CustomerIdentity,
    payment_status: PaymentStatus,
) -> Result<InsertOutcome, OrderError> {
    let now = Utc::now();

    // An identity the users table does not know is stored as a guest order
    let result = sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, idempotency_key, user_id,
            customer_name, customer_email, customer_phone,
            shipping_address, shipping_city, shipping_state, shipping_postal_code, notes,
            status, payment_method, payment_status,
            subtotal_cents, shipping_fee_cents, total_cents,
            created_at, updated_at
        ) VALUES (
            ?, ?, ?, (SELECT id FROM users WHERE id = ?),
            ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?,
            ?, ?, ?,
            ?, ?
        )
        "#,
    )
    .bind(order_id)
    .bind(order_number)
    .bind(&draft.idempotency_key)
    .bind(&identity.user_id)
    .bind(&draft.customer_name)
    .bind(&draft.customer_email)
    .bind(&draft.customer_phone)
    .bind(&draft.shipping_address)
    .bind(&draft.shipping_city)
    .bind(&draft.shipping_state)
    .bind(&draft.shipping_postal_code)
    .bind(&draft.notes)
    .bind(OrderStatus::Pending)
    .bind(draft.payment_method)
    .bind(payment_status)
    .bind(cents(draft.subtotal)?)
    .bind(cents(draft.shipping_fee)?)
    .bind(cents(draft.total)?)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => {
            debug!("Inserted order row {} ({})", order_id, order_number);
            Ok(InsertOutcome::Inserted)
        }
        Err(e) if is_unique_violation_on(&e, "orders.idempotency_key") => {
            Ok(InsertOutcome::AlreadySubmitted)
        }
        Err(e) if is_unique_violation_on(&e, "orders.order_number") => Ok(InsertOutcome::NumberTaken),
        Err(e) => {
            error!("Failed to insert order {}: {}", order_number, e);
            Err(e.into())
        }
    }
}

/// Decrement stock only if enough remains; the check and the write are one statement
async fn reserve_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    quantity: i64,
) -> Result<(), OrderError> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?, updated_at = ?
        WHERE id = ? AND is_active = 1 AND stock >= ?
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 1 {
        debug!("Reserved {} unit(s) of {}", quantity, product_id);
        return Ok(());
    }

    let current: Option<(String, i64, bool)> =
        sqlx::query_as("SELECT name, stock, is_active FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

    match current {
        Some((product_name, available, true)) => Err(OrderError::InsufficientStock {
            product_id: product_id.to_string(),
            product_name,
            requested: quantity,
            available,
        }),
        _ => Err(OrderError::ProductNotFound(product_id.to_string())),
    }
}
