use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::{
    cart_items::CartItemEntity,
    order_items::{InsertOrderItemEntity, OrderItemEntity},
    orders::{InsertOrderEntity, OrderEntity},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItemDto {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub seller_id: i32,
    pub price: Decimal,
    pub qty: i32,
}

impl From<OrderItemEntity> for OrderItemDto {
    fn from(entity: OrderItemEntity) -> Self {
        Self {
            id: entity.id,
            product_id: entity.product_id,
            name: entity.name,
            image_url: entity.image_url,
            seller_id: entity.seller_id,
            price: entity.price,
            qty: entity.qty,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderDto {
    pub id: i32,
    pub status: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub order_ref: String,
    pub payment_id: i32,
    pub items: Vec<OrderItemDto>,
    pub created_at: DateTime<Utc>,
}

impl OrderDto {
    pub fn from_parts(order: OrderEntity, items: Vec<OrderItemEntity>) -> Self {
        Self {
            id: order.id,
            status: order.status,
            amount: order.amount,
            transaction_id: order.transaction_id,
            order_ref: order.order_ref,
            payment_id: order.payment_id,
            items: items.into_iter().map(OrderItemDto::from).collect(),
            created_at: order.created_at,
        }
    }
}

/// One line of an order as seen by the seller who fulfils it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SellerOrderItemDto {
    pub order_id: i32,
    pub order_ref: String,
    pub order_status: String,
    pub order_item_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub price: Decimal,
    pub qty: i32,
    pub ordered_at: DateTime<Utc>,
}

impl SellerOrderItemDto {
    pub fn from_parts(order: &OrderEntity, item: OrderItemEntity) -> Self {
        Self {
            order_id: order.id,
            order_ref: order.order_ref.clone(),
            order_status: order.status.clone(),
            order_item_id: item.id,
            product_id: item.product_id,
            name: item.name,
            image_url: item.image_url,
            price: item.price,
            qty: item.qty,
            ordered_at: order.created_at,
        }
    }
}

/// Order header plus item snapshots handed to the repository in one unit.
///
/// `cart_lines` are the lines the snapshot was taken from. The repository
/// only clears those, and only when the cart still holds exactly them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderModel {
    pub order: InsertOrderEntity,
    pub items: Vec<InsertOrderItemEntity>,
    pub cart_lines: Vec<CartItemEntity>,
}

impl NewOrderModel {
    pub fn from_cart(order: InsertOrderEntity, cart_items: &[CartItemEntity]) -> Self {
        let items = cart_items
            .iter()
            .map(|line| InsertOrderItemEntity {
                order_id: 0,
                product_id: line.product_id,
                name: line.name.clone(),
                image_url: line.image_url.clone(),
                seller_id: line.seller_id,
                price: line.price,
                qty: line.qty,
                created_at: order.created_at,
            })
            .collect();

        Self {
            order,
            items,
            cart_lines: cart_items.to_vec(),
        }
    }

    pub fn cart_item_ids(&self) -> Vec<i32> {
        self.cart_lines.iter().map(|line| line.id).collect()
    }

    /// True when `current` holds the same lines, at the same price and
    /// quantity, as the snapshot.
    pub fn matches_cart(&self, current: &[CartItemEntity]) -> bool {
        if current.len() != self.cart_lines.len() {
            return false;
        }

        let key = |line: &CartItemEntity| (line.id, line.product_id, line.price, line.qty);
        let mut expected: Vec<_> = self.cart_lines.iter().map(key).collect();
        let mut found: Vec<_> = current.iter().map(key).collect();
        expected.sort_unstable_by_key(|entry| entry.0);
        found.sort_unstable_by_key(|entry| entry.0);
        expected == found
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOrderOutcome {
    Created(OrderEntity, Vec<OrderItemEntity>),
    /// `order_ref` collided with an existing order; nothing was written.
    DuplicateOrderRef,
    /// The payment already produced an order; nothing was written.
    AlreadyFinalized(OrderEntity, Vec<OrderItemEntity>),
    /// The cart no longer matches the snapshot; nothing was written.
    CartChanged,
}
