use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::orders::InsertOrderEntity,
    repositories::{carts::CartRepository, orders::OrderRepository},
    value_objects::{
        carts::cart_total,
        enums::{order_statuses::OrderStatus, payment_statuses::PaymentStatus},
        iam::Identity,
        orders::{CreateOrderOutcome, NewOrderModel, OrderDto, SellerOrderItemDto},
        payments::PaymentModel,
    },
};
use rand::{Rng, distributions::Alphanumeric};
use tracing::{error, info, warn};

use crate::{
    auth::AuthError,
    errors::{UseCaseError, UseCaseResult, store_error},
};

pub const ORDER_REF_LEN: usize = 16;
const MAX_ORDER_REF_ATTEMPTS: usize = 3;

/// Opaque reference shared by a gateway session and the order it produces.
pub fn generate_order_ref() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_REF_LEN)
        .map(char::from)
        .collect()
}

pub struct OrderUseCase<O, C>
where
    O: OrderRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    order_repository: Arc<O>,
    cart_repository: Arc<C>,
}

impl<O, C> OrderUseCase<O, C>
where
    O: OrderRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub fn new(order_repository: Arc<O>, cart_repository: Arc<C>) -> Self {
        Self {
            order_repository,
            cart_repository,
        }
    }

    /// Turns the owner's cart into an order for a successful payment and
    /// clears the cart in the same store transaction.
    ///
    /// Calling it again for the same payment returns the existing order.
    pub async fn finalize_order(
        &self,
        owner_id: i32,
        payment: &PaymentModel,
    ) -> UseCaseResult<OrderDto> {
        if payment.user_id != owner_id {
            warn!(owner_id, payment_id = payment.id, "orders: payment owned by another user");
            return Err(UseCaseError::Conflict(
                "payment does not belong to this user".to_string(),
            ));
        }
        if payment.status != PaymentStatus::Success {
            return Err(UseCaseError::Conflict(format!(
                "payment is {}, not success",
                payment.status
            )));
        }

        if let Some((order, items)) = self
            .order_repository
            .find_by_payment_id(payment.id)
            .await
            .map_err(store_error("orders: failed to look up order by payment"))?
        {
            info!(order_id = order.id, payment_id = payment.id, "orders: already finalized");
            return Ok(OrderDto::from_parts(order, items));
        }

        let lines = self
            .cart_repository
            .find_items(owner_id)
            .await
            .map_err(store_error("orders: failed to load cart items"))?;
        let total = cart_total(&lines);
        if lines.is_empty() || total != payment.amount {
            error!(
                owner_id,
                payment_id = payment.id,
                %total,
                paid = %payment.amount,
                "orders: cart no longer matches the paid amount"
            );
            return Err(UseCaseError::Conflict(
                "cart changed after checkout, order was not created".to_string(),
            ));
        }

        let transaction_id = payment
            .transaction_id
            .clone()
            .unwrap_or_else(|| payment.session_id.clone());
        let mut order_ref = payment.order_ref.clone();

        for attempt in 1..=MAX_ORDER_REF_ATTEMPTS {
            let now = Utc::now();
            let order = InsertOrderEntity {
                user_id: owner_id,
                status: OrderStatus::Paid.to_string(),
                amount: total,
                transaction_id: transaction_id.clone(),
                order_ref: order_ref.clone(),
                payment_id: payment.id,
                created_at: now,
                updated_at: now,
            };

            let outcome = self
                .order_repository
                .create_from_cart(NewOrderModel::from_cart(order, &lines))
                .await
                .map_err(store_error("orders: failed to create order"))?;

            match outcome {
                CreateOrderOutcome::Created(order, items) => {
                    info!(
                        order_id = order.id,
                        payment_id = payment.id,
                        items = items.len(),
                        "orders: created"
                    );
                    return Ok(OrderDto::from_parts(order, items));
                }
                CreateOrderOutcome::AlreadyFinalized(order, items) => {
                    info!(order_id = order.id, payment_id = payment.id, "orders: finalized concurrently");
                    return Ok(OrderDto::from_parts(order, items));
                }
                CreateOrderOutcome::CartChanged => {
                    warn!(owner_id, payment_id = payment.id, "orders: cart changed during finalize");
                    return Err(UseCaseError::Conflict(
                        "cart changed after checkout, order was not created".to_string(),
                    ));
                }
                CreateOrderOutcome::DuplicateOrderRef => {
                    warn!(attempt, %order_ref, "orders: order reference collision, regenerating");
                    order_ref = generate_order_ref();
                }
            }
        }

        Err(UseCaseError::Conflict(
            "could not allocate a unique order reference".to_string(),
        ))
    }

    pub async fn list_orders(&self, identity: &Identity) -> UseCaseResult<Vec<OrderDto>> {
        let orders = self
            .order_repository
            .find_orders(identity.user_id)
            .await
            .map_err(store_error("orders: failed to list orders"))?;

        Ok(orders
            .into_iter()
            .map(|(order, items)| OrderDto::from_parts(order, items))
            .collect())
    }

    pub async fn get_order(&self, identity: &Identity, order_id: i32) -> UseCaseResult<OrderDto> {
        let (order, items) = self
            .order_repository
            .find_order(identity.user_id, order_id)
            .await
            .map_err(store_error("orders: failed to load order"))?
            .ok_or_else(|| UseCaseError::NotFound("order".to_string()))?;

        Ok(OrderDto::from_parts(order, items))
    }

    pub async fn list_seller_orders(
        &self,
        identity: &Identity,
    ) -> UseCaseResult<Vec<SellerOrderItemDto>> {
        if !identity.is_seller() {
            return Err(AuthError::NotSeller.into());
        }

        let rows = self
            .order_repository
            .find_seller_items(identity.user_id)
            .await
            .map_err(store_error("orders: failed to list seller orders"))?;

        Ok(rows
            .into_iter()
            .map(|(order, item)| SellerOrderItemDto::from_parts(&order, item))
            .collect())
    }
}
