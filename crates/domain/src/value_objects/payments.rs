use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    entities::payments::PaymentEntity,
    value_objects::{enums::payment_statuses::PaymentStatus, orders::OrderDto},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentModel {
    pub id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub session_id: String,
    pub payment_url: String,
    pub order_ref: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentEntity> for PaymentModel {
    type Error = anyhow::Error;

    fn try_from(entity: PaymentEntity) -> Result<Self, Self::Error> {
        let status = PaymentStatus::from_str(&entity.status).ok_or_else(|| {
            anyhow::anyhow!(
                "payment {} has unknown status {:?}",
                entity.id,
                entity.status
            )
        })?;

        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            amount: entity.amount,
            currency: entity.currency,
            status,
            session_id: entity.session_id,
            payment_url: entity.payment_url,
            order_ref: entity.order_ref,
            transaction_id: entity.transaction_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutSessionDto {
    pub payment_id: i32,
    pub payment_url: String,
    /// `true` when an unresolved session was returned instead of a new one.
    pub reused: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutConfirmationDto {
    pub payment_id: i32,
    pub status: PaymentStatus,
    pub order: Option<OrderDto>,
}
