use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::schema::order_items;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = order_items)]
pub struct OrderItemEntity {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub seller_id: i32,
    pub price: Decimal,
    pub qty: i32,
    pub created_at: DateTime<Utc>,
}

/// Item snapshot taken from a cart line; `order_id` is assigned by the repository.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = order_items)]
pub struct InsertOrderItemEntity {
    pub order_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub seller_id: i32,
    pub price: Decimal,
    pub qty: i32,
    pub created_at: DateTime<Utc>,
}
