// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides the response envelope and maps storage and order errors to HTTP statuses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use storefront_orders::OrderError;
use storefront_storage::StorageError;
use tracing::error;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Field-level problems for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: None,
        }
    }

    pub fn error_with_details(message: String, details: Vec<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: Some(details),
        }
    }
}

/// Shorthand for a 200 response carrying `data` in the envelope
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, ResponseJson(ApiResponse::success(data))).into_response()
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, ResponseJson(ApiResponse::<()>::error(message.into()))).into_response()
}

/// Convert storage errors to HTTP responses
impl IntoResponse for ApiStorageError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, message) = match &err {
            StorageError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            StorageError::Duplicate(_) => (StatusCode::CONFLICT, err.to_string()),
            StorageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            StorageError::Database(_) | StorageError::Sqlx(_) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            _ => {
                error!("Storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        error_response(status, message)
    }
}

/// Storage failure on its way to becoming an HTTP response
pub struct ApiStorageError(pub StorageError);

impl From<StorageError> for ApiStorageError {
    fn from(err: StorageError) -> Self {
        ApiStorageError(err)
    }
}

/// Order failure on its way to becoming an HTTP response
pub struct ApiOrderError(pub OrderError);

impl From<OrderError> for ApiOrderError {
    fn from(err: OrderError) -> Self {
        ApiOrderError(err)
    }
}

pub fn order_error_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrderError::InsufficientStock { .. }
        | OrderError::InvalidTransition { .. }
        | OrderError::PaymentUpdateRejected { .. } => StatusCode::CONFLICT,
        OrderError::RequestTimeout => StatusCode::GATEWAY_TIMEOUT,
        OrderError::PersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiOrderError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = order_error_status(&err);

        match &err {
            OrderError::ValidationFailed(_) => {
                let body = ApiResponse::<()>::error_with_details(err.to_string(), err.details());
                (status, ResponseJson(body)).into_response()
            }
            OrderError::PersistenceFailed(detail) => {
                error!("Order persistence failed: {}", detail);
                error_response(status, "Failed to save order, please try again")
            }
            _ => error_response(status, err.to_string()),
        }
    }
}
