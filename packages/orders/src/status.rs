// ABOUTME: Order status lifecycle: guarded transitions, cancellation stock policy and payment updates
// ABOUTME: Uses compare-and-set updates so a concurrent change cannot overwrite a terminal status

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use storefront_core::{CustomerIdentity, Order, OrderStatus, PaymentStatus};
use tracing::{debug, info, warn};

use crate::error::OrderError;
use crate::storage::{OrderFilter, OrderStorage};

/// What happens to reserved stock when an order is cancelled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancellationPolicy {
    /// Stock stays decremented; restocking is a manual catalog edit
    #[default]
    RetainStock,
    /// Item quantities return to stock in the same transaction as the cancellation
    Restock,
}

impl CancellationPolicy {
    pub fn from_restock_flag(restock: bool) -> Self {
        if restock {
            CancellationPolicy::Restock
        } else {
            CancellationPolicy::RetainStock
        }
    }
}

/// Attempts at a compare-and-set before reporting the conflicting status
const MAX_TRANSITION_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct OrderStatusMachine {
    pool: SqlitePool,
    orders: OrderStorage,
    policy: CancellationPolicy,
}

impl OrderStatusMachine {
    pub fn new(pool: SqlitePool, policy: CancellationPolicy) -> Self {
        let orders = OrderStorage::new(pool.clone());
        Self {
            pool,
            orders,
            policy,
        }
    }

    pub fn policy(&self) -> CancellationPolicy {
        self.policy
    }

    /// Read side shared with the order history and admin views
    pub fn orders(&self) -> &OrderStorage {
        &self.orders
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.orders.get_order(order_id).await
    }

    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Order>, i64), OrderError> {
        self.orders.list_orders(filter, limit, offset).await
    }

    pub async fn get_orders_for_user(
        &self,
        identity: &CustomerIdentity,
    ) -> Result<Vec<Order>, OrderError> {
        self.orders.get_orders_for_user(identity).await
    }

    /// Move an order to `target` and return the updated order.
    ///
    /// Fails with `OrderNotFound` for an unknown id and with
    /// `InvalidTransition` when the table does not allow the move from the
    /// order's current status.
    pub async fn transition(
        &self,
        order_id: &str,
        target: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut current = self.current_status(order_id).await?;

        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            if !current.can_transition_to(target) {
                warn!(
                    "Rejected transition of order {} from {} to {}",
                    order_id, current, target
                );
                return Err(OrderError::InvalidTransition {
                    from: current,
                    to: target,
                });
            }

            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
            )
            .bind(target)
            .bind(Utc::now())
            .bind(order_id)
            .bind(current)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                let latest = self.current_status(order_id).await?;
                debug!(
                    "Order {} moved from {} to {} concurrently",
                    order_id, current, latest
                );
                current = latest;
                continue;
            }

            if target == OrderStatus::Cancelled && self.policy == CancellationPolicy::Restock {
                let restocked = sqlx::query(
                    r#"
                    UPDATE products
                    SET stock = stock + (
                        SELECT SUM(i.quantity) FROM order_items i
                        WHERE i.order_id = ? AND i.product_id = products.id
                    ),
                    updated_at = ?
                    WHERE id IN (SELECT product_id FROM order_items WHERE order_id = ?)
                    "#,
                )
                .bind(order_id)
                .bind(Utc::now())
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
                debug!(
                    "Restocked {} product(s) for cancelled order {}",
                    restocked.rows_affected(),
                    order_id
                );
            }

            tx.commit().await?;
            info!("Order {} transitioned from {} to {}", order_id, current, target);

            return self.orders.get_order(order_id).await;
        }

        Err(OrderError::InvalidTransition {
            from: current,
            to: target,
        })
    }

    /// Record the outcome of a payment confirmation.
    ///
    /// Cancelled orders only accept `Refunded`. Otherwise the last write wins.
    pub async fn update_payment_status(
        &self,
        order_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = ?, updated_at = ?
            WHERE id = ? AND (status <> 'CANCELLED' OR ? = 'REFUNDED')
            "#,
        )
        .bind(payment_status)
        .bind(Utc::now())
        .bind(order_id)
        .bind(payment_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let status = self.current_status(order_id).await?;
            warn!(
                "Rejected payment status {} for {} order {}",
                payment_status, status, order_id
            );
            return Err(OrderError::PaymentUpdateRejected {
                status,
                requested: payment_status.to_string(),
            });
        }

        info!("Order {} payment status set to {}", order_id, payment_status);
        self.orders.get_order(order_id).await
    }

    async fn current_status(&self, order_id: &str) -> Result<OrderStatus, OrderError> {
        sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }
}
