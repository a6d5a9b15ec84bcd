// ABOUTME: Read interface the order core needs from the product catalog
// ABOUTME: Lets order submission look up price, stock and availability snapshots

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ProductSnapshot;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog lookup failed: {0}")]
    Lookup(String),
}

/// Product catalog read API consumed at order-creation time
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a single product; `None` when it does not exist
    async fn find_by_id(&self, product_id: &str) -> Result<Option<ProductSnapshot>, CatalogError>;

    /// Look up several products at once, keyed by id. Unknown ids are absent.
    async fn find_many(
        &self,
        product_ids: &[String],
    ) -> Result<HashMap<String, ProductSnapshot>, CatalogError> {
        let mut found = HashMap::new();
        for id in product_ids {
            if found.contains_key(id) {
                continue;
            }
            if let Some(snapshot) = self.find_by_id(id).await? {
                found.insert(id.clone(), snapshot);
            }
        }
        Ok(found)
    }
}
