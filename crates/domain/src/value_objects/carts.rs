use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::cart_items::CartItemEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartModel {
    pub product_id: i32,
    pub qty: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartItemDto {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub price: Decimal,
    pub qty: i32,
    pub seller_id: i32,
}

impl From<CartItemEntity> for CartItemDto {
    fn from(entity: CartItemEntity) -> Self {
        Self {
            id: entity.id,
            product_id: entity.product_id,
            name: entity.name,
            image_url: entity.image_url,
            price: entity.price,
            qty: entity.qty,
            seller_id: entity.seller_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartDto {
    pub items: Vec<CartItemDto>,
    pub total: Decimal,
}

/// Sum of `price * qty` over the given lines.
pub fn cart_total(items: &[CartItemEntity]) -> Decimal {
    items
        .iter()
        .map(|item| item.price * Decimal::from(item.qty))
        .sum()
}
