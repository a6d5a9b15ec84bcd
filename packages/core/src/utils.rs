// ABOUTME: Shared utility functions for Storefront
// ABOUTME: Order number generation and contact-field normalisation

use chrono::Utc;
use rand::Rng;

const ORDER_SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ORDER_SUFFIX_LEN: usize = 9;

/// Generate a human-readable order number: `ORD_<unix millis>_<random>`, upper-cased.
///
/// Collisions are possible in principle; the `orders.order_number` unique
/// constraint is what guarantees uniqueness.
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ORDER_SUFFIX_CHARSET.len());
            ORDER_SUFFIX_CHARSET[idx] as char
        })
        .collect();
    format_order_number(Utc::now().timestamp_millis(), &suffix)
}

pub fn format_order_number(timestamp_millis: i64, suffix: &str) -> String {
    format!("ORD_{}_{}", timestamp_millis, suffix).to_uppercase()
}

/// Trim and lower-case an email address for storage and matching
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim an optional field, treating blank input as absent
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
