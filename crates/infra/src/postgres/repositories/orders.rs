use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, PgConnection, RunQueryDsl, delete, insert_into, prelude::*};
use std::{collections::HashMap, sync::Arc};
use tracing::warn;

use crate::postgres::postgres_connection::{PgPoolSquad, unique_violation};
use domain::{
    entities::{
        cart_items::CartItemEntity,
        order_items::{InsertOrderItemEntity, OrderItemEntity},
        orders::OrderEntity,
    },
    repositories::orders::{OrderRepository, OrderWithItems},
    schema::{cart_items, order_items, orders, payments},
    value_objects::orders::{CreateOrderOutcome, NewOrderModel},
};

const ORDER_REF_CONSTRAINT: &str = "orders_order_ref_key";
const PAYMENT_ID_CONSTRAINT: &str = "orders_payment_id_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderConflict {
    OrderRef,
    PaymentFinalized,
}

fn order_conflict(err: &diesel::result::Error) -> Option<OrderConflict> {
    match unique_violation(err)? {
        ORDER_REF_CONSTRAINT => Some(OrderConflict::OrderRef),
        PAYMENT_ID_CONSTRAINT => Some(OrderConflict::PaymentFinalized),
        _ => None,
    }
}

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn load_items(
    conn: &mut PgConnection,
    order_ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<OrderItemEntity>>> {
    let items = order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .order(order_items::id.asc())
        .select(OrderItemEntity::as_select())
        .load::<OrderItemEntity>(conn)?;

    let mut grouped: HashMap<i32, Vec<OrderItemEntity>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

fn with_items(conn: &mut PgConnection, orders: Vec<OrderEntity>) -> QueryResult<Vec<OrderWithItems>> {
    let ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let mut items = load_items(conn, &ids)?;

    Ok(orders
        .into_iter()
        .map(|order| {
            let order_items = items.remove(&order.id).unwrap_or_default();
            (order, order_items)
        })
        .collect())
}

fn find_for_payment(conn: &mut PgConnection, payment_id: i32) -> QueryResult<Option<OrderWithItems>> {
    let order = orders::table
        .filter(orders::payment_id.eq(payment_id))
        .select(OrderEntity::as_select())
        .first::<OrderEntity>(conn)
        .optional()?;

    match order {
        Some(order) => Ok(with_items(conn, vec![order])?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn create_from_cart(&self, new_order: NewOrderModel) -> Result<CreateOrderOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let payment_id = new_order.order.payment_id;

        let result = conn.transaction::<CreateOrderOutcome, diesel::result::Error, _>(|tx| {
            // Serialises concurrent finalizers of the same payment.
            payments::table
                .find(payment_id)
                .select(payments::id)
                .for_update()
                .first::<i32>(tx)?;

            if let Some((order, items)) = find_for_payment(tx, payment_id)? {
                return Ok(CreateOrderOutcome::AlreadyFinalized(order, items));
            }

            let current = cart_items::table
                .filter(cart_items::user_id.eq(new_order.order.user_id))
                .order(cart_items::id.asc())
                .select(CartItemEntity::as_select())
                .for_update()
                .load::<CartItemEntity>(tx)?;
            if !new_order.matches_cart(&current) {
                return Ok(CreateOrderOutcome::CartChanged);
            }
            let cart_item_ids = new_order.cart_item_ids();

            let order = insert_into(orders::table)
                .values(&new_order.order)
                .returning(OrderEntity::as_returning())
                .get_result::<OrderEntity>(tx)?;

            let rows: Vec<InsertOrderItemEntity> = new_order
                .items
                .into_iter()
                .map(|item| InsertOrderItemEntity {
                    order_id: order.id,
                    ..item
                })
                .collect();
            let items = insert_into(order_items::table)
                .values(&rows)
                .returning(OrderItemEntity::as_returning())
                .get_results::<OrderItemEntity>(tx)?;

            // Lines inserted after the lock above are not part of this order.
            delete(cart_items::table.filter(cart_items::id.eq_any(cart_item_ids))).execute(tx)?;

            Ok(CreateOrderOutcome::Created(order, items))
        });

        let err = match result {
            Ok(outcome) => return Ok(outcome),
            Err(err) => err,
        };
        match order_conflict(&err) {
            Some(OrderConflict::OrderRef) => Ok(CreateOrderOutcome::DuplicateOrderRef),
            Some(OrderConflict::PaymentFinalized) => {
                warn!(payment_id, "orders: payment finalized by a concurrent transaction");
                let (order, items) = find_for_payment(&mut conn, payment_id)?
                    .ok_or_else(|| anyhow::anyhow!("order for payment {payment_id} vanished"))?;
                Ok(CreateOrderOutcome::AlreadyFinalized(order, items))
            }
            None => Err(err.into()),
        }
    }

    async fn find_orders(&self, user_id: i32) -> Result<Vec<OrderWithItems>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = orders::table
            .filter(orders::user_id.eq(user_id))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        Ok(with_items(&mut conn, found)?)
    }

    async fn find_order(&self, user_id: i32, order_id: i32) -> Result<Option<OrderWithItems>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::user_id.eq(user_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        match order {
            Some(order) => Ok(with_items(&mut conn, vec![order])?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_payment_id(&self, payment_id: i32) -> Result<Option<OrderWithItems>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        Ok(find_for_payment(&mut conn, payment_id)?)
    }

    async fn find_seller_items(&self, seller_id: i32) -> Result<Vec<(OrderEntity, OrderItemEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = order_items::table
            .inner_join(orders::table)
            .filter(order_items::seller_id.eq(seller_id))
            .order((orders::created_at.desc(), order_items::id.asc()))
            .select((OrderEntity::as_select(), OrderItemEntity::as_select()))
            .load::<(OrderEntity, OrderItemEntity)>(&mut conn)?;

        Ok(rows)
    }
}
