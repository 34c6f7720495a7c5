use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::cart_items::{CartItemEntity, InsertCartItemEntity},
    repositories::carts::CartRepository,
    schema::cart_items,
};

pub struct CartPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CartPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CartRepository for CartPostgres {
    async fn find_items(&self, user_id: i32) -> Result<Vec<CartItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let items = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::id.asc())
            .select(CartItemEntity::as_select())
            .load::<CartItemEntity>(&mut conn)?;

        Ok(items)
    }

    async fn find_item(&self, user_id: i32, product_id: i32) -> Result<Option<CartItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let item = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::product_id.eq(product_id))
            .select(CartItemEntity::as_select())
            .first::<CartItemEntity>(&mut conn)
            .optional()?;

        Ok(item)
    }

    async fn insert_item(&self, item: InsertCartItemEntity) -> Result<CartItemEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // A concurrent add of the same product collapses into one line.
        let saved = insert_into(cart_items::table)
            .values(&item)
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set((
                cart_items::qty.eq(item.qty),
                cart_items::updated_at.eq(item.updated_at),
            ))
            .returning(CartItemEntity::as_returning())
            .get_result::<CartItemEntity>(&mut conn)?;

        Ok(saved)
    }

    async fn update_qty(&self, item_id: i32, qty: i32) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(cart_items::table.find(item_id))
            .set((
                cart_items::qty.eq(qty),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete_item(&self, item_id: i32) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(cart_items::table.find(item_id)).execute(&mut conn)?;

        Ok(())
    }
}
