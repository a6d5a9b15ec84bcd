// ABOUTME: Order domain type definitions
// ABOUTME: Orders, line items, status and payment enums, submissions and product snapshots

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of an order.
///
/// `Delivered` and `Cancelled` are terminal. From any other status an order may
/// move forward to any later status (skipping is an administrative override) or
/// to `Cancelled`; it never moves backward and never re-enters its own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses reachable from this one in a single transition
    pub fn allowed_targets(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Processing, Shipped, Delivered, Cancelled],
            Confirmed => &[Processing, Shipped, Delivered, Cancelled],
            Processing => &[Shipped, Delivered, Cancelled],
            Shipped => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

/// How the customer intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash-on-delivery",
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::BankTransfer => "bank-transfer",
        }
    }

    /// Payment status an order starts with for this method.
    ///
    /// Cash on delivery is collected later, so it starts `Pending`. Gateway
    /// methods wait on the gateway's own confirmation.
    pub fn initial_payment_status(self) -> PaymentStatus {
        match self {
            PaymentMethod::CashOnDelivery => PaymentStatus::Pending,
            PaymentMethod::Card | PaymentMethod::Paypal | PaymentMethod::BankTransfer => {
                PaymentStatus::AwaitingGateway
            }
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cash-on-delivery" | "cod" => Ok(PaymentMethod::CashOnDelivery),
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            _ => Err(ParseEnumError {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    AwaitingGateway,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::AwaitingGateway => "AWAITING_GATEWAY",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "AWAITING_GATEWAY" => Ok(PaymentStatus::AwaitingGateway),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            _ => Err(ParseEnumError {
                kind: "payment status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: Option<String>,

    // Customer contact
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,

    // Shipping
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: Option<String>,
    pub notes: Option<String>,

    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,

    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,

    pub items: Vec<OrderItem>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item, immutable once its order is created.
///
/// `price` is the unit price captured when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub total: Decimal,
}

/// One cart line as posted by the checkout UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// Order creation payload posted by the checkout UI.
///
/// Every field defaults so that a partially filled form reaches the validator
/// and gets a complete list of problems instead of a parse rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSubmission {
    /// Client-chosen correlation token, reused across retries of one attempt
    pub order_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<LineItemInput>,
    pub total: Option<Decimal>,
}

/// Price and availability of a product as read from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub product_id: String,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// A validated, normalised order that has not been persisted yet.
///
/// Prices and totals come from the catalog, never from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub idempotency_key: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<DraftLine>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
}

/// Who is asking, as vouched for by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl CustomerIdentity {
    pub fn user(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
        }
    }

    pub fn guest(email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminal_statuses_have_no_targets() {
        for status in OrderStatus::ALL {
            assert_eq!(status.is_terminal(), status.allowed_targets().is_empty());
        }
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_forward_skips_are_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_backward_and_self_transitions_are_rejected() {
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_cancelled_reachable_from_every_non_terminal_status() {
        for status in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
        }
    }

    #[test]
    fn test_order_status_parsing() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" DELIVERED ".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        let err = "LOST".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown order status: LOST");
    }

    #[test]
    fn test_payment_method_initial_status() {
        let cod: PaymentMethod = "cash-on-delivery".parse().unwrap();
        assert_eq!(cod.initial_payment_status(), PaymentStatus::Pending);
        assert_eq!(
            PaymentMethod::Card.initial_payment_status(),
            PaymentStatus::AwaitingGateway
        );
        assert!("barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
        let json = serde_json::to_string(&PaymentStatus::AwaitingGateway).unwrap();
        assert_eq!(json, "\"AWAITING_GATEWAY\"");
    }

    #[test]
    fn test_submission_defaults_missing_fields() {
        let submission: OrderSubmission =
            serde_json::from_str(r#"{"customerName": "Ada", "items": [{"productId": "P1"}]}"#)
                .unwrap();
        assert_eq!(submission.customer_name, "Ada");
        assert_eq!(submission.customer_email, "");
        assert_eq!(submission.items[0].quantity, 0);
        assert!(submission.total.is_none());
    }
}
