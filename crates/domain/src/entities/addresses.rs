use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::addresses;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = addresses)]
pub struct AddressEntity {
    pub id: i32,
    pub user_id: i32,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub post_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = addresses)]
pub struct InsertAddressEntity {
    pub user_id: i32,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub post_code: String,
    pub country: String,
    pub updated_at: DateTime<Utc>,
}
