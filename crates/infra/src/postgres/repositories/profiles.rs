use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::addresses::{AddressEntity, InsertAddressEntity},
    repositories::profiles::ProfileRepository,
    schema::addresses,
};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find_address(&self, user_id: i32) -> Result<Option<AddressEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let address = addresses::table
            .filter(addresses::user_id.eq(user_id))
            .select(AddressEntity::as_select())
            .first::<AddressEntity>(&mut conn)
            .optional()?;

        Ok(address)
    }

    async fn upsert_address(&self, address: InsertAddressEntity) -> Result<AddressEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let saved = insert_into(addresses::table)
            .values(&address)
            .on_conflict(addresses::user_id)
            .do_update()
            .set(&address)
            .returning(AddressEntity::as_returning())
            .get_result::<AddressEntity>(&mut conn)?;

        Ok(saved)
    }
}
