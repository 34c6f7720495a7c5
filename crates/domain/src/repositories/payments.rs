use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentStatusEntity};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    /// Most recent payment of the user still in `initial`.
    async fn find_latest_initial(&self, user_id: i32) -> Result<Option<PaymentEntity>>;

    /// Most recent payment of the user in `initial` or `pending`.
    async fn find_latest_unresolved(&self, user_id: i32) -> Result<Option<PaymentEntity>>;

    async fn find_by_id(&self, payment_id: i32) -> Result<Option<PaymentEntity>>;

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<PaymentEntity>>;

    /// Returns `None` when the user already holds an `initial` payment.
    async fn create_initial(&self, payment: InsertPaymentEntity) -> Result<Option<PaymentEntity>>;

    /// Compare-and-set: only applies while the row is `initial` or `pending`.
    /// Returns `None` when the row had already left those states.
    async fn transition_status(
        &self,
        payment_id: i32,
        changes: UpdatePaymentStatusEntity,
    ) -> Result<Option<PaymentEntity>>;
}
