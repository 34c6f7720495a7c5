use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::schema::cart_items;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cart_items)]
pub struct CartItemEntity {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub price: Decimal,
    pub qty: i32,
    pub seller_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = cart_items)]
pub struct InsertCartItemEntity {
    pub user_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub price: Decimal,
    pub qty: i32,
    pub seller_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
