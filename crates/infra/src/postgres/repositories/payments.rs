use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentStatusEntity},
    repositories::payments::PaymentRepository,
    schema::payments,
    value_objects::enums::payment_statuses::PaymentStatus,
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn unresolved_statuses() -> Vec<&'static str> {
    PaymentStatus::unresolved()
        .iter()
        .map(PaymentStatus::as_str)
        .collect()
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn find_latest_initial(&self, user_id: i32) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::status.eq(PaymentStatus::Initial.as_str()))
            .order((payments::created_at.desc(), payments::id.desc()))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_latest_unresolved(&self, user_id: i32) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::status.eq_any(unresolved_statuses()))
            .order((payments::created_at.desc(), payments::id.desc()))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_by_id(&self, payment_id: i32) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .find(payment_id)
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::session_id.eq(session_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn create_initial(&self, payment: InsertPaymentEntity) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // payments_one_initial_per_user turns a second open checkout into a no-op.
        let created = insert_into(payments::table)
            .values(&payment)
            .on_conflict_do_nothing()
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(created)
    }

    async fn transition_status(
        &self,
        payment_id: i32,
        changes: UpdatePaymentStatusEntity,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            payments::table
                .filter(payments::id.eq(payment_id))
                .filter(payments::status.eq_any(unresolved_statuses())),
        )
        .set(&changes)
        .returning(PaymentEntity::as_returning())
        .get_result::<PaymentEntity>(&mut conn)
        .optional()?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use crate::postgres::postgres_connection::test_support::MIGRATION;

    #[test]
    fn open_checkout_index_only_covers_initial_payments() {
        let index = MIGRATION
            .split(';')
            .find(|statement| statement.contains("payments_one_initial_per_user"))
            .unwrap();

        assert!(index.contains("CREATE UNIQUE INDEX"));
        assert!(index.contains("ON payments (user_id) WHERE status = 'initial'"));
    }
}
