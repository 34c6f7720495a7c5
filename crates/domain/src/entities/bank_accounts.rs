use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::bank_accounts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = bank_accounts)]
pub struct BankAccountEntity {
    pub id: i32,
    pub user_id: i32,
    pub account_number: String,
    pub swift_code: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bank_accounts)]
pub struct InsertBankAccountEntity {
    pub user_id: i32,
    pub account_number: String,
    pub swift_code: String,
    pub payment_type: String,
}
