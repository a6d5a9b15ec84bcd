// ABOUTME: Client-side checkout for Storefront
// ABOUTME: Cart handling and idempotent order submission over HTTP

pub mod cart;
pub mod client;
pub mod error;
pub mod request;

pub use cart::{Cart, CartLine};
pub use client::{CheckoutClient, OrderConfirmation, RetryPolicy};
pub use error::{CheckoutError, CheckoutResult};
pub use request::{CheckoutRequest, CustomerDetails, ShippingDetails};
