// ABOUTME: Core types, validation and utilities for Storefront
// ABOUTME: Foundational package shared by the catalog, order and API packages

pub mod catalog;
pub mod constants;
pub mod money;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    CustomerIdentity, DraftLine, LineItemInput, Order, OrderDraft, OrderItem, OrderStatus,
    OrderSubmission, ParseEnumError, PaymentMethod, PaymentStatus, ProductSnapshot,
};

// Re-export the catalog seam
pub use catalog::{CatalogError, ProductCatalog};

// Re-export constants
pub use constants::{database_file, storefront_dir};

// Re-export utilities
pub use money::{checked_line_total, checked_sum, from_cents, line_total, round_money, to_cents};
pub use utils::{generate_order_number, normalize_email};

// Re-export validation
pub use validation::{OrderValidator, PricingPolicy, StockShortage, ValidationError};
