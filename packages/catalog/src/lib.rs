// ABOUTME: Product catalog for Storefront
// ABOUTME: Provides product types, storage, and the catalog read API used by orders

pub mod storage;
pub mod types;

// Re-export main types
pub use storage::ProductStorage;
pub use types::{Product, ProductCreateInput, ProductUpdateInput};
