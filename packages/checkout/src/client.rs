// ABOUTME: HTTP client that submits checkout requests to the order API
// ABOUTME: Applies a per-request timeout and retries transient failures with the same order token

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_config::constants::STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS;
use storefront_core::{OrderStatus, PaymentStatus};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};
use crate::request::CheckoutRequest;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What the server returns for an accepted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub order_number: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// True when the server had already accepted this attempt
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Vec<String>,
}

/// How many times and how quickly a submission is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
        }
    }
}

pub struct CheckoutClient {
    client: Client,
    base_url: String,
}

impl CheckoutClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckoutError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client whose timeout comes from STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS
    pub fn from_env(base_url: impl Into<String>) -> CheckoutResult<Self> {
        let secs = match std::env::var(STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS) {
            Ok(value) => value.trim().parse::<u64>().map_err(|_| {
                CheckoutError::Configuration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS, value
                ))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if secs == 0 {
            return Err(CheckoutError::Configuration(format!(
                "{} must be greater than zero",
                STOREFRONT_HTTP_REQUEST_TIMEOUT_SECS
            )));
        }

        Self::new(base_url, Duration::from_secs(secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit the order once
    pub async fn submit(&self, request: &CheckoutRequest) -> CheckoutResult<OrderConfirmation> {
        let url = format!("{}/api/orders", self.base_url);
        debug!("Submitting order {} to {}", request.token(), url);

        let response = self
            .client
            .post(&url)
            .json(request.submission())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let confirmation: OrderConfirmation = response.json().await?;
                info!(
                    "Order {} accepted as {}",
                    request.token(),
                    confirmation.order_number
                );
                Ok(confirmation)
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Err(CheckoutError::RequestTimeout)
            }
            status => {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| status.to_string());
                Err(error_for_status(status, &text))
            }
        }
    }

    /// Submit the order, retrying timeouts and server failures.
    ///
    /// Every attempt posts the same payload, including the order token.
    pub async fn submit_with_retry(
        &self,
        request: &CheckoutRequest,
        policy: &RetryPolicy,
    ) -> CheckoutResult<OrderConfirmation> {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(policy.initial_interval)
            .with_max_interval(policy.max_interval)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let max_attempts = policy.max_attempts.max(1);

        retry(backoff, || {
            let attempts = &attempts;
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                match self.submit(request).await {
                    Ok(confirmation) => Ok(confirmation),
                    Err(e) if e.is_retryable() && attempt < max_attempts => {
                        warn!(
                            "Order {} attempt {}/{} failed, retrying: {}",
                            request.token(),
                            attempt,
                            max_attempts,
                            e
                        );
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }
}

fn error_for_status(status: StatusCode, body: &str) -> CheckoutError {
    let (message, details) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => (
            parsed.error.unwrap_or_else(|| status.to_string()),
            parsed.details,
        ),
        Err(_) => (body.to_string(), Vec::new()),
    };

    match status {
        StatusCode::BAD_REQUEST => CheckoutError::Rejected { message, details },
        StatusCode::NOT_FOUND => CheckoutError::ProductNotFound(message),
        StatusCode::CONFLICT => CheckoutError::InsufficientStock(message),
        status => CheckoutError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_body_maps_to_rejected() {
        let body = r#"{"success":false,"error":"Order validation failed with 1 error(s)","details":["customerEmail: Please enter a valid email address"]}"#;
        match error_for_status(StatusCode::BAD_REQUEST, body) {
            CheckoutError::Rejected { message, details } => {
                assert_eq!(message, "Order validation failed with 1 error(s)");
                assert_eq!(
                    details,
                    vec!["customerEmail: Please enter a valid email address".to_string()]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_body_is_kept() {
        let err = error_for_status(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Server error (502): upstream unavailable");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = CheckoutClient::new("http://localhost:4001/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4001");
    }
}
