// ABOUTME: Error types for the checkout client
// ABOUTME: Maps HTTP outcomes of an order submission onto retryable and final failures

use thiserror::Error;

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    /// The server refused the order form; `details` lists each field problem
    #[error("{message}")]
    Rejected {
        message: String,
        details: Vec<String>,
    },

    #[error("{0}")]
    ProductNotFound(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("The order request timed out")]
    RequestTimeout,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CheckoutError {
    /// Whether resubmitting the same request may succeed.
    ///
    /// Retries reuse the order token, so the server never creates a second
    /// order for an attempt that did land.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::RequestTimeout | CheckoutError::Network(_) => true,
            CheckoutError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
