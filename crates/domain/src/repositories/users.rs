use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::{
    bank_accounts::InsertBankAccountEntity,
    users::{InsertUserEntity, UpdateUserEntity, UserEntity},
};

#[automock]
#[async_trait]
pub trait UserRepository {
    /// Returns `None` when the email is already registered.
    async fn create(&self, user: InsertUserEntity) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserEntity>>;

    async fn update(&self, user_id: i32, changes: UpdateUserEntity) -> Result<UserEntity>;

    /// Applies the seller changes and inserts the bank account atomically.
    /// Returns `None` when the bank account collides with an existing one.
    async fn promote_to_seller(
        &self,
        user_id: i32,
        changes: UpdateUserEntity,
        bank_account: InsertBankAccountEntity,
    ) -> Result<Option<UserEntity>>;
}
