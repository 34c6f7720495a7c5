use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::products::ProductEntity;

/// Read path of the catalog.
#[automock]
#[async_trait]
pub trait ProductCatalog {
    async fn find_by_id(&self, product_id: i32) -> Result<Option<ProductEntity>>;
}
