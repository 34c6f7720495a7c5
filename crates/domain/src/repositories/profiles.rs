use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::addresses::{AddressEntity, InsertAddressEntity};

#[automock]
#[async_trait]
pub trait ProfileRepository {
    async fn find_address(&self, user_id: i32) -> Result<Option<AddressEntity>>;

    async fn upsert_address(&self, address: InsertAddressEntity) -> Result<AddressEntity>;
}
