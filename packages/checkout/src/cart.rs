// ABOUTME: Client-side shopping cart held until checkout
// ABOUTME: Keeps ordered product lines and converts them into order line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{line_total, round_money, LineItemInput};

/// One product line in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
}

impl CartLine {
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }
}

/// Cart lines in the order the customer added them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add units of a product. Adding a product already in the cart merges
    /// the quantities and keeps the latest price and name.
    pub fn add(
        &mut self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        price: Decimal,
    ) {
        if quantity <= 0 {
            return;
        }
        let product_id = product_id.into();
        let name = name.into();

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.price = price;
                line.name = name;
            }
            None => self.lines.push(CartLine {
                product_id,
                name,
                quantity,
                price,
            }),
        }
    }

    /// Set the quantity of a line; zero or less removes it.
    /// Returns false when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        round_money(self.lines.iter().map(CartLine::total).sum())
    }

    pub fn to_line_items(&self) -> Vec<LineItemInput> {
        self.lines
            .iter()
            .map(|line| LineItemInput {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.price,
                total: Some(line.total()),
            })
            .collect()
    }
}
