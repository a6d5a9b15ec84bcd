// ABOUTME: Authoritative server-side validation of order submissions
// ABOUTME: Checks contact fields, line items against catalog snapshots, and asserted totals

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::money::{checked_line_total, checked_sum, round_money, within_tolerance};
use crate::types::{DraftLine, OrderDraft, OrderSubmission, PaymentMethod, ProductSnapshot};
use crate::utils::{non_blank, normalize_email};

const AMOUNT_TOO_LARGE: &str = "Amount is too large";

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");

    /// Regional mobile/landline patterns, checked against the digits-only form
    static ref REGIONAL_PHONE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "north-america",
            Regex::new(r"^(\+?1)?[2-9]\d{2}[2-9]\d{6}$").expect("NANP pattern compiles"),
        ),
        (
            "united-kingdom",
            Regex::new(r"^(\+44|0)7\d{9}$").expect("UK pattern compiles"),
        ),
        (
            "india",
            Regex::new(r"^(\+91|0)?[6-9]\d{9}$").expect("India pattern compiles"),
        ),
        (
            "pakistan",
            Regex::new(r"^(\+92|0)?3\d{9}$").expect("Pakistan pattern compiles"),
        ),
    ];

    static ref INTERNATIONAL_PHONE_RE: Regex =
        Regex::new(r"^\+?[1-9]\d{7,14}$").expect("international pattern compiles");
}

/// A single field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Set when the only thing wrong is that the catalog holds too few units
    pub stock_shortage: Option<StockShortage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub product_id: String,
    pub product_name: String,
    pub requested: i64,
    pub available: i64,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
            stock_shortage: None,
        }
    }

    fn out_of_stock(field: String, shortage: StockShortage) -> Self {
        ValidationError {
            field,
            message: format!(
                "Only {} of {} left in stock (requested {})",
                shortage.available, shortage.product_name, shortage.requested
            ),
            stock_shortage: Some(shortage),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Name of the phone pattern a number matches, falling back to `"international"`
pub fn phone_region(phone: &str) -> Option<&'static str> {
    let compact: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    REGIONAL_PHONE_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&compact))
        .map(|(region, _)| *region)
        .or_else(|| INTERNATIONAL_PHONE_RE.is_match(&compact).then_some("international"))
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_region(phone).is_some()
}

/// Shipping and tolerance rules applied when recomputing totals
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    /// Flat surcharge added to every order
    pub shipping_fee: Decimal,
    /// Subtotal at or above which the shipping fee is waived
    pub free_shipping_threshold: Option<Decimal>,
    /// Largest accepted difference between client-asserted and computed amounts
    pub tolerance: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            shipping_fee: Decimal::ZERO,
            free_shipping_threshold: None,
            tolerance: Decimal::new(1, 2),
        }
    }
}

impl PricingPolicy {
    pub fn shipping_fee_for(&self, subtotal: Decimal) -> Decimal {
        match self.free_shipping_threshold {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => round_money(self.shipping_fee),
        }
    }
}

/// The authoritative gate in front of order persistence.
///
/// Client-side checks are a convenience only; this re-checks everything
/// against catalog snapshots and reports every problem it finds.
#[derive(Debug, Clone, Default)]
pub struct OrderValidator {
    policy: PricingPolicy,
}

impl OrderValidator {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn validate(
        &self,
        submission: &OrderSubmission,
        catalog: &HashMap<String, ProductSnapshot>,
    ) -> Result<OrderDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let required = [
            ("customerName", submission.customer_name.as_str(), "Name"),
            ("customerEmail", submission.customer_email.as_str(), "Email"),
            ("customerPhone", submission.customer_phone.as_str(), "Phone"),
            ("shippingAddress", submission.shipping_address.as_str(), "Address"),
            ("shippingCity", submission.shipping_city.as_str(), "City"),
            ("shippingState", submission.shipping_state.as_str(), "State"),
        ];
        for (field, value, label) in required {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(field, format!("{} is required", label)));
            }
        }

        if !submission.customer_email.trim().is_empty() && !is_valid_email(&submission.customer_email)
        {
            errors.push(ValidationError::new(
                "customerEmail",
                "Please enter a valid email address",
            ));
        }

        if !submission.customer_phone.trim().is_empty() && !is_valid_phone(&submission.customer_phone)
        {
            errors.push(ValidationError::new(
                "customerPhone",
                "Please enter a valid phone number",
            ));
        }

        let payment_method = if submission.payment_method.trim().is_empty() {
            errors.push(ValidationError::new(
                "paymentMethod",
                "Payment method is required",
            ));
            None
        } else {
            match submission.payment_method.parse::<PaymentMethod>() {
                Ok(method) => Some(method),
                Err(e) => {
                    errors.push(ValidationError::new("paymentMethod", e.to_string()));
                    None
                }
            }
        };

        let lines = self.validate_items(submission, catalog, &mut errors);

        let subtotal = match checked_sum(lines.iter().map(|line| line.total)) {
            Some(subtotal) => subtotal,
            None => {
                errors.push(ValidationError::new("items", AMOUNT_TOO_LARGE));
                Decimal::ZERO
            }
        };
        let shipping_fee = self.policy.shipping_fee_for(subtotal);
        let total = match subtotal.checked_add(shipping_fee) {
            Some(total) => round_money(total),
            None => {
                errors.push(ValidationError::new("total", AMOUNT_TOO_LARGE));
                Decimal::ZERO
            }
        };

        match submission.total {
            None => errors.push(ValidationError::new("total", "Order total is required")),
            // Only comparable when every line resolved to a catalog price
            Some(asserted) if lines.len() == submission.items.len() && !lines.is_empty() => {
                if !within_tolerance(asserted, total, self.policy.tolerance) {
                    errors.push(ValidationError::new(
                        "total",
                        format!(
                            "Order total {} does not match computed total {}",
                            asserted, total
                        ),
                    ));
                }
            }
            Some(_) => {}
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let Some(payment_method) = payment_method else {
            return Err(vec![ValidationError::new(
                "paymentMethod",
                "Payment method is required",
            )]);
        };

        Ok(OrderDraft {
            idempotency_key: non_blank(submission.order_id.as_deref()),
            customer_name: submission.customer_name.trim().to_string(),
            customer_email: normalize_email(&submission.customer_email),
            customer_phone: submission.customer_phone.trim().to_string(),
            shipping_address: submission.shipping_address.trim().to_string(),
            shipping_city: submission.shipping_city.trim().to_string(),
            shipping_state: submission.shipping_state.trim().to_string(),
            shipping_postal_code: non_blank(submission.shipping_postal_code.as_deref()),
            notes: non_blank(submission.notes.as_deref()),
            payment_method,
            lines,
            subtotal,
            shipping_fee,
            total,
        })
    }

    /// Check every line and return the lines that resolved to a catalog product
    fn validate_items(
        &self,
        submission: &OrderSubmission,
        catalog: &HashMap<String, ProductSnapshot>,
        errors: &mut Vec<ValidationError>,
    ) -> Vec<DraftLine> {
        if submission.items.is_empty() {
            errors.push(ValidationError::new(
                "items",
                "Order must contain at least one item",
            ));
            return Vec::new();
        }

        let tolerance = self.policy.tolerance;
        let mut lines = Vec::with_capacity(submission.items.len());
        // product id -> (first line index, total requested quantity)
        let mut requested: Vec<(&str, usize, i64)> = Vec::new();

        for (index, item) in submission.items.iter().enumerate() {
            let field = |name: &str| format!("items[{}].{}", index, name);
            let mut line_ok = true;

            let product_id = item.product_id.trim();
            if product_id.is_empty() {
                errors.push(ValidationError::new(field("productId"), "Product is required"));
                continue;
            }

            if item.quantity <= 0 {
                errors.push(ValidationError::new(
                    field("quantity"),
                    "Quantity must be a positive integer",
                ));
                line_ok = false;
            }

            if item.price <= Decimal::ZERO {
                errors.push(ValidationError::new(
                    field("price"),
                    "Unit price must be a positive number",
                ));
                line_ok = false;
            }

            let snapshot = match catalog.get(product_id) {
                Some(snapshot) => snapshot,
                None => {
                    errors.push(ValidationError::new(
                        field("productId"),
                        format!("Product {} does not exist", product_id),
                    ));
                    continue;
                }
            };

            if !snapshot.is_active {
                errors.push(ValidationError::new(
                    field("productId"),
                    format!("{} is no longer available", snapshot.name),
                ));
                continue;
            }

            if item.price > Decimal::ZERO && !within_tolerance(item.price, snapshot.price, tolerance)
            {
                errors.push(ValidationError::new(
                    field("price"),
                    format!(
                        "Price of {} has changed to {}",
                        snapshot.name,
                        round_money(snapshot.price)
                    ),
                ));
                line_ok = false;
            }

            if item.quantity > 0 {
                match requested.iter_mut().find(|(id, _, _)| *id == product_id) {
                    Some(entry) => match entry.2.checked_add(item.quantity) {
                        Some(sum) => entry.2 = sum,
                        None => {
                            errors.push(ValidationError::new(
                                field("quantity"),
                                "Quantity is too large",
                            ));
                            entry.2 = i64::MAX;
                            line_ok = false;
                        }
                    },
                    None => requested.push((product_id, index, item.quantity)),
                }
            }

            // Amounts are only computed for lines whose price and quantity passed
            if !line_ok {
                continue;
            }

            let Some(total) = checked_line_total(snapshot.price, item.quantity) else {
                errors.push(ValidationError::new(field("quantity"), AMOUNT_TOO_LARGE));
                continue;
            };

            if let Some(asserted) = item.total {
                let client_total = checked_line_total(item.price, item.quantity);
                if !client_total.is_some_and(|t| within_tolerance(asserted, t, tolerance)) {
                    errors.push(ValidationError::new(
                        field("total"),
                        "Line total does not equal price times quantity",
                    ));
                    continue;
                }
            }

            lines.push(DraftLine {
                product_id: snapshot.id.clone(),
                product_name: snapshot.name.clone(),
                product_sku: snapshot.sku.clone(),
                quantity: item.quantity,
                unit_price: snapshot.price,
                total,
            });
        }

        for (product_id, first_index, quantity) in requested {
            if let Some(snapshot) = catalog.get(product_id) {
                if quantity > snapshot.stock {
                    errors.push(ValidationError::out_of_stock(
                        format!("items[{}].quantity", first_index),
                        StockShortage {
                            product_id: snapshot.id.clone(),
                            product_name: snapshot.name.clone(),
                            requested: quantity,
                            available: snapshot.stock.max(0),
                        },
                    ));
                }
            }
        }

        lines
    }
}
