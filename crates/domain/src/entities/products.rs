use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::schema::products;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = products)]
pub struct ProductEntity {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: Decimal,
    pub stock: i32,
    /// Seller that owns the listing.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
