use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::postgres::postgres_connection::{PgPoolSquad, unique_violation};
use domain::{
    entities::{
        bank_accounts::InsertBankAccountEntity,
        users::{InsertUserEntity, UpdateUserEntity, UserEntity},
    },
    repositories::users::UserRepository,
    schema::{bank_accounts, users},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn create(&self, user: InsertUserEntity) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = insert_into(users::table)
            .values(&user)
            .on_conflict(users::email)
            .do_nothing()
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)
            .optional()?;

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .find(user_id)
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn update(&self, user_id: i32, changes: UpdateUserEntity) -> Result<UserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = update(users::table.find(user_id))
            .set(&changes)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(user)
    }

    async fn promote_to_seller(
        &self,
        user_id: i32,
        changes: UpdateUserEntity,
        bank_account: InsertBankAccountEntity,
    ) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<UserEntity, diesel::result::Error, _>(|tx| {
            let seller = update(users::table.find(user_id))
                .set(&changes)
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(tx)?;

            insert_into(bank_accounts::table)
                .values(&bank_account)
                .execute(tx)?;

            Ok(seller)
        });

        match result {
            Ok(seller) => Ok(Some(seller)),
            Err(err) if unique_violation(&err).is_some_and(|name| name.starts_with("bank_accounts_")) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
