use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::cart_items::{CartItemEntity, InsertCartItemEntity};

#[automock]
#[async_trait]
pub trait CartRepository {
    async fn find_items(&self, user_id: i32) -> Result<Vec<CartItemEntity>>;

    async fn find_item(&self, user_id: i32, product_id: i32) -> Result<Option<CartItemEntity>>;

    async fn insert_item(&self, item: InsertCartItemEntity) -> Result<CartItemEntity>;

    async fn update_qty(&self, item_id: i32, qty: i32) -> Result<()>;

    async fn delete_item(&self, item_id: i32) -> Result<()>;
}
