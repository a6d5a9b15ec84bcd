// ABOUTME: Shared application state handed to every request handler
// ABOUTME: Bundles the pool with the catalog, order and identity services built on it

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use storefront_catalog::ProductStorage;
use storefront_core::{OrderValidator, PricingPolicy};
use storefront_orders::{CancellationPolicy, OrderStatusMachine, OrderStorage, OrderWriter};
use storefront_storage::UserStorage;

/// Business settings the services are built with
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub pricing: PricingPolicy,
    pub cancellation: CancellationPolicy,
    /// Upper bound on a single order submission
    pub submit_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            cancellation: CancellationPolicy::default(),
            submit_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub product_storage: Arc<ProductStorage>,
    pub order_storage: Arc<OrderStorage>,
    pub order_writer: Arc<OrderWriter>,
    pub status_machine: Arc<OrderStatusMachine>,
    pub user_storage: Arc<UserStorage>,
    pub submit_timeout: Duration,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: ApiSettings) -> Self {
        let product_storage = Arc::new(ProductStorage::new(pool.clone()));
        let order_writer = Arc::new(OrderWriter::new(
            pool.clone(),
            product_storage.clone(),
            OrderValidator::new(settings.pricing),
        ));

        Self {
            order_storage: Arc::new(OrderStorage::new(pool.clone())),
            status_machine: Arc::new(OrderStatusMachine::new(
                pool.clone(),
                settings.cancellation,
            )),
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            product_storage,
            order_writer,
            submit_timeout: settings.submit_timeout,
            pool,
        }
    }
}
