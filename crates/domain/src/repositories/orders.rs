use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::{
    entities::{order_items::OrderItemEntity, orders::OrderEntity},
    value_objects::orders::{CreateOrderOutcome, NewOrderModel},
};

pub type OrderWithItems = (OrderEntity, Vec<OrderItemEntity>);

#[automock]
#[async_trait]
pub trait OrderRepository {
    /// Inserts the order with its items and deletes the owner's cart lines in
    /// one transaction.
    async fn create_from_cart(&self, new_order: NewOrderModel) -> Result<CreateOrderOutcome>;

    async fn find_orders(&self, user_id: i32) -> Result<Vec<OrderWithItems>>;

    async fn find_order(&self, user_id: i32, order_id: i32) -> Result<Option<OrderWithItems>>;

    async fn find_by_payment_id(&self, payment_id: i32) -> Result<Option<OrderWithItems>>;

    async fn find_seller_items(&self, seller_id: i32) -> Result<Vec<(OrderEntity, OrderItemEntity)>>;
}
