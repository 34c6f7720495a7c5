use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::schema::payments;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub session_id: String,
    pub payment_url: String,
    pub order_ref: String,
    pub transaction_id: Option<String>,
    pub response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub session_id: String,
    pub payment_url: String,
    pub order_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = payments)]
pub struct UpdatePaymentStatusEntity {
    pub status: String,
    pub transaction_id: Option<String>,
    pub response: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
