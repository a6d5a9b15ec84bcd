// ABOUTME: A single checkout attempt built from the cart and the checkout form
// ABOUTME: Carries the order token that makes retries of the attempt idempotent

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{round_money, OrderSubmission, PaymentMethod};
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::CheckoutError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

/// One checkout attempt. The token is generated once here and every retry
/// of the attempt sends the same payload.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    token: String,
    submission: OrderSubmission,
}

impl CheckoutRequest {
    pub fn new(
        cart: &Cart,
        customer: CustomerDetails,
        shipping: ShippingDetails,
        payment_method: PaymentMethod,
        shipping_fee: Decimal,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let token = Uuid::new_v4().to_string();
        let submission = OrderSubmission {
            order_id: Some(token.clone()),
            customer_name: customer.name,
            customer_email: customer.email,
            customer_phone: customer.phone,
            shipping_address: shipping.address,
            shipping_city: shipping.city,
            shipping_state: shipping.state,
            shipping_postal_code: shipping.postal_code,
            payment_method: payment_method.as_str().to_string(),
            notes: shipping.notes,
            items: cart.to_line_items(),
            total: Some(round_money(cart.subtotal() + shipping_fee)),
        };

        Ok(Self { token, submission })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn submission(&self) -> &OrderSubmission {
        &self.submission
    }

    pub fn total(&self) -> Decimal {
        self.submission.total.unwrap_or_default()
    }
}
