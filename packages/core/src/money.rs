// ABOUTME: Money arithmetic helpers
// ABOUTME: Rounding to cents and conversion between decimals and stored minor units

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to whole cents, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer cents for storage.
///
/// Returns `None` when the amount does not fit in an `i64`.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Unit price times quantity, rounded to cents.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn checked_line_total(unit_price: Decimal, quantity: i64) -> Option<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
}

/// Like [`checked_line_total`], saturating at `Decimal::MAX`
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    checked_line_total(unit_price, quantity).unwrap_or(Decimal::MAX)
}

/// Sum of amounts, `None` on overflow
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// Whether two amounts differ by no more than `tolerance`.
/// Amounts too far apart to subtract never match.
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|difference| difference.abs() <= tolerance)
}
