// ABOUTME: Catalog seeding from a JSON product export
// ABOUTME: Creates each listed product and skips ones whose id or SKU already exists

use std::path::Path;

use anyhow::{Context, Result};
use storefront_catalog::{ProductCreateInput, ProductStorage};
use storefront_storage::StorageError;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Parse a JSON array of products
pub fn parse_products(json: &str) -> Result<Vec<ProductCreateInput>> {
    serde_json::from_str(json).context("Seed file must be a JSON array of products")
}

pub async fn seed_products(storage: &ProductStorage, path: &Path) -> Result<SeedSummary> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let products = parse_products(&json)?;

    let mut summary = SeedSummary::default();
    for input in products {
        let label = input.id.clone().unwrap_or_else(|| input.name.clone());
        match storage.create_product(input).await {
            Ok(product) => {
                info!("Seeded product {} ({})", product.id, product.name);
                summary.created += 1;
            }
            Err(StorageError::Duplicate(key)) => {
                warn!("Skipping product {}: {} already exists", label, key);
                summary.skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to seed product {}", label));
            }
        }
    }

    Ok(summary)
}
