// ABOUTME: Error taxonomy for order submission and lifecycle operations
// ABOUTME: Separates user-correctable, data-conflict, operator and infrastructure failures

use storefront_core::{CatalogError, OrderStatus, ValidationError};
use storefront_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    /// One or more fields of the submission are wrong; every problem is listed
    #[error("Order validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationError>),

    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        product_name: String,
        requested: i64,
        available: i64,
    },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Payment status of a {status} order cannot be changed to {requested}")]
    PaymentUpdateRejected {
        status: OrderStatus,
        requested: String,
    },

    #[error("Order request timed out")]
    RequestTimeout,

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}

impl OrderError {
    /// Infrastructure failures that are safe to retry with the same order token
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::PersistenceFailed(_) | OrderError::RequestTimeout
        )
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::ValidationFailed(_) => "VALIDATION_FAILED",
            OrderError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            OrderError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            OrderError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            OrderError::InvalidTransition { .. } => "INVALID_TRANSITION",
            OrderError::PaymentUpdateRejected { .. } => "PAYMENT_UPDATE_REJECTED",
            OrderError::RequestTimeout => "REQUEST_TIMEOUT",
            OrderError::PersistenceFailed(_) => "PERSISTENCE_FAILED",
        }
    }

    /// Field-level messages for validation failures, empty otherwise
    pub fn details(&self) -> Vec<String> {
        match self {
            OrderError::ValidationFailed(errors) => errors.iter().map(|e| e.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        OrderError::PersistenceFailed(err.to_string())
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::PersistenceFailed(err.to_string())
    }
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        OrderError::PersistenceFailed(err.to_string())
    }
}
