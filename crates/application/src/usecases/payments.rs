use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentStatusEntity},
    repositories::{carts::CartRepository, orders::OrderRepository, payments::PaymentRepository},
    value_objects::{
        carts::cart_total,
        enums::payment_statuses::PaymentStatus,
        iam::Identity,
        money::{MinorUnitsError, to_minor_units},
        payments::{CheckoutConfirmationDto, CheckoutSessionDto, PaymentModel},
    },
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::{
    errors::{UseCaseError, UseCaseResult, store_error},
    interfaces::payment_gateway::{
        CreateSessionRequest, GatewayEventKind, GatewayPaymentState, GatewaySessionStatus,
        PaymentGateway,
    },
    usecases::orders::{OrderUseCase, generate_order_ref},
};

/// One async mutex per user, serialising checkout initiation.
#[derive(Default)]
pub struct CheckoutLocks {
    locks: Mutex<HashMap<i32, Arc<Mutex<()>>>>,
}

impl CheckoutLocks {
    pub async fn acquire(&self, user_id: i32) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on can go.
            locks.retain(|id, lock| *id == user_id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

pub struct PaymentUseCase<P, C, O, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    payment_repository: Arc<P>,
    cart_repository: Arc<C>,
    order_usecase: Arc<OrderUseCase<O, C>>,
    gateway: Arc<G>,
    checkout_locks: CheckoutLocks,
    currency: String,
    gateway_timeout: Duration,
}

impl<P, C, O, G> PaymentUseCase<P, C, O, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        payment_repository: Arc<P>,
        cart_repository: Arc<C>,
        order_usecase: Arc<OrderUseCase<O, C>>,
        gateway: Arc<G>,
        currency: String,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            payment_repository,
            cart_repository,
            order_usecase,
            gateway,
            checkout_locks: CheckoutLocks::default(),
            currency,
            gateway_timeout,
        }
    }

    /// Returns the caller's open checkout session, or opens one for the
    /// current cart total.
    pub async fn initiate_checkout(&self, identity: &Identity) -> UseCaseResult<CheckoutSessionDto> {
        let user_id = identity.user_id;
        let _guard = self.checkout_locks.acquire(user_id).await;
        info!(user_id, "payments: checkout requested");

        if let Some(reused) = self.reusable_session(user_id).await? {
            return Ok(reused);
        }

        let lines = self
            .cart_repository
            .find_items(user_id)
            .await
            .map_err(store_error("payments: failed to load cart items"))?;
        let total = cart_total(&lines);
        if lines.is_empty() || total <= rust_decimal::Decimal::ZERO {
            return Err(UseCaseError::Validation("cart is empty".to_string()));
        }

        let order_ref = generate_order_ref();
        let amount_minor = to_minor_units(total).map_err(|err| match err {
            MinorUnitsError::NotPositive => UseCaseError::Validation(
                "cart total is below the smallest chargeable amount".to_string(),
            ),
            MinorUnitsError::TooLarge => {
                warn!(user_id, %total, "payments: cart total exceeds the storable amount");
                UseCaseError::Validation("cart total exceeds the largest chargeable amount".to_string())
            }
        })?;

        let request = CreateSessionRequest {
            amount_minor,
            currency: self.currency.clone(),
            user_id,
            order_ref: order_ref.clone(),
        };
        let session = self
            .call_gateway("create session", self.gateway.create_session(request))
            .await?;

        let now = Utc::now();
        let insert = InsertPaymentEntity {
            user_id,
            amount: total,
            currency: self.currency.clone(),
            status: PaymentStatus::Initial.to_string(),
            session_id: session.session_id.clone(),
            payment_url: session.redirect_url.clone(),
            order_ref,
            created_at: now,
            updated_at: now,
        };

        match self.payment_repository.create_initial(insert).await {
            Ok(Some(payment)) => {
                info!(
                    user_id,
                    payment_id = payment.id,
                    session_id = %payment.session_id,
                    amount_minor,
                    "payments: checkout session created"
                );
                Ok(CheckoutSessionDto {
                    payment_id: payment.id,
                    payment_url: payment.payment_url,
                    reused: false,
                })
            }
            Ok(None) => {
                warn!(
                    user_id,
                    session_id = %session.session_id,
                    "payments: another checkout won the race, gateway session left orphaned"
                );
                self.reusable_session(user_id).await?.ok_or_else(|| {
                    UseCaseError::Conflict("checkout already in progress, please retry".to_string())
                })
            }
            Err(err) => {
                error!(
                    user_id,
                    session_id = %session.session_id,
                    db_error = ?err,
                    "payments: gateway session created but payment was not stored"
                );
                Err(UseCaseError::Store(err))
            }
        }
    }

    /// Moves a payment along `initial -> {pending, success, failed}`,
    /// `pending -> {success, failed}`.
    pub async fn update_status(
        &self,
        payment_id: i32,
        new_status: PaymentStatus,
        raw_response: Option<serde_json::Value>,
        transaction_id: Option<String>,
    ) -> UseCaseResult<PaymentModel> {
        if new_status == PaymentStatus::Initial {
            return Err(UseCaseError::Validation(
                "payments cannot move back to initial".to_string(),
            ));
        }

        let current = self.find_payment(payment_id).await?;
        if current.status.is_terminal() {
            warn!(payment_id, status = %current.status, "payments: update on a terminal payment");
            return Err(UseCaseError::Conflict(format!(
                "payment is already {}",
                current.status
            )));
        }
        if !current.status.can_transition_to(new_status) {
            return Err(UseCaseError::Conflict(format!(
                "payment cannot move from {} to {}",
                current.status, new_status
            )));
        }

        let changes = UpdatePaymentStatusEntity {
            status: new_status.to_string(),
            transaction_id,
            response: raw_response,
            updated_at: Utc::now(),
        };
        let updated = self
            .payment_repository
            .transition_status(payment_id, changes)
            .await
            .map_err(store_error("payments: failed to update payment status"))?
            .ok_or_else(|| {
                warn!(payment_id, "payments: status changed concurrently");
                UseCaseError::Conflict("payment status changed concurrently".to_string())
            })?;

        info!(payment_id, from = %current.status, to = %new_status, "payments: status updated");
        to_model(updated)
    }

    /// Polls the gateway for the caller's open payment and settles it.
    pub async fn confirm_checkout(
        &self,
        identity: &Identity,
    ) -> UseCaseResult<CheckoutConfirmationDto> {
        let payment = self
            .payment_repository
            .find_latest_unresolved(identity.user_id)
            .await
            .map_err(store_error("payments: failed to load unresolved payment"))?
            .ok_or_else(|| UseCaseError::NotFound("pending payment".to_string()))?;
        let payment = to_model(payment)?;

        let status = self
            .call_gateway("get status", self.gateway.get_status(&payment.session_id))
            .await?;

        self.settle(identity.user_id, payment, status).await
    }

    /// Applies a signed gateway notification. Replays and unknown sessions are
    /// acknowledged without side effects.
    pub async fn handle_gateway_webhook(&self, payload: &[u8], signature: &str) -> UseCaseResult<()> {
        let event = self.gateway.verify_webhook(payload, signature).map_err(|err| {
            warn!(error = ?err, "payments: webhook rejected");
            UseCaseError::Validation("invalid webhook payload or signature".to_string())
        })?;

        let target = match (&event.kind, &event.session) {
            (GatewayEventKind::Other(kind), _) => {
                debug!(%kind, "payments: webhook event ignored");
                return Ok(());
            }
            (_, None) => {
                warn!(kind = ?event.kind, "payments: webhook event without session");
                return Ok(());
            }
            (GatewayEventKind::CheckoutCompleted, Some(session)) => match session.state {
                GatewayPaymentState::Paid => PaymentStatus::Success,
                GatewayPaymentState::Unpaid => PaymentStatus::Pending,
                GatewayPaymentState::Expired | GatewayPaymentState::Failed => PaymentStatus::Failed,
            },
            (GatewayEventKind::AsyncPaymentSucceeded, Some(_)) => PaymentStatus::Success,
            (GatewayEventKind::AsyncPaymentFailed | GatewayEventKind::CheckoutExpired, Some(_)) => {
                PaymentStatus::Failed
            }
        };
        let Some(session) = event.session else {
            return Ok(());
        };

        let Some(payment) = self
            .payment_repository
            .find_by_session_id(&session.session_id)
            .await
            .map_err(store_error("payments: failed to load payment by session"))?
        else {
            warn!(session_id = %session.session_id, "payments: webhook for unknown session");
            return Ok(());
        };
        let payment = to_model(payment)?;

        if payment.status == target {
            if target == PaymentStatus::Success {
                // Redelivery after a crash between status update and order creation.
                self.order_usecase
                    .finalize_order(payment.user_id, &payment)
                    .await?;
            }
            debug!(payment_id = payment.id, status = %target, "payments: webhook already applied");
            return Ok(());
        }
        if !payment.status.can_transition_to(target) {
            info!(
                payment_id = payment.id,
                status = %payment.status,
                target = %target,
                "payments: webhook skipped for settled payment"
            );
            return Ok(());
        }

        let updated = self
            .update_status(payment.id, target, Some(session.raw), session.transaction_id)
            .await?;
        if updated.status == PaymentStatus::Success {
            self.order_usecase
                .finalize_order(updated.user_id, &updated)
                .await?;
        }

        Ok(())
    }

    async fn settle(
        &self,
        owner_id: i32,
        payment: PaymentModel,
        status: GatewaySessionStatus,
    ) -> UseCaseResult<CheckoutConfirmationDto> {
        let target = match status.state {
            GatewayPaymentState::Paid => Some(PaymentStatus::Success),
            GatewayPaymentState::Expired | GatewayPaymentState::Failed => Some(PaymentStatus::Failed),
            GatewayPaymentState::Unpaid
                if status.completed && payment.status == PaymentStatus::Initial =>
            {
                Some(PaymentStatus::Pending)
            }
            GatewayPaymentState::Unpaid => None,
        };

        let Some(target) = target else {
            debug!(payment_id = payment.id, "payments: checkout still open");
            return Ok(CheckoutConfirmationDto {
                payment_id: payment.id,
                status: payment.status,
                order: None,
            });
        };

        let updated = self
            .update_status(payment.id, target, Some(status.raw), status.transaction_id)
            .await?;
        let order = if updated.status == PaymentStatus::Success {
            Some(self.order_usecase.finalize_order(owner_id, &updated).await?)
        } else {
            None
        };

        Ok(CheckoutConfirmationDto {
            payment_id: updated.id,
            status: updated.status,
            order,
        })
    }

    /// An `initial` payment with a redirect URL is handed back as-is. One
    /// without a URL can never be completed, so it is failed and superseded.
    async fn reusable_session(&self, user_id: i32) -> UseCaseResult<Option<CheckoutSessionDto>> {
        let Some(existing) = self
            .payment_repository
            .find_latest_initial(user_id)
            .await
            .map_err(store_error("payments: failed to load initial payment"))?
        else {
            return Ok(None);
        };

        if !existing.payment_url.is_empty() {
            info!(user_id, payment_id = existing.id, "payments: reusing open checkout session");
            return Ok(Some(CheckoutSessionDto {
                payment_id: existing.id,
                payment_url: existing.payment_url,
                reused: true,
            }));
        }

        warn!(user_id, payment_id = existing.id, "payments: superseding initial payment without url");
        self.update_status(existing.id, PaymentStatus::Failed, None, None)
            .await?;
        Ok(None)
    }

    async fn find_payment(&self, payment_id: i32) -> UseCaseResult<PaymentModel> {
        let payment = self
            .payment_repository
            .find_by_id(payment_id)
            .await
            .map_err(store_error("payments: failed to load payment"))?
            .ok_or_else(|| UseCaseError::NotFound("payment".to_string()))?;
        to_model(payment)
    }

    async fn call_gateway<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> UseCaseResult<T> {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                error!(operation, error = ?err, "payments: gateway call failed");
                Err(UseCaseError::Gateway(err))
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_secs = self.gateway_timeout.as_secs_f64(),
                    "payments: gateway call timed out"
                );
                Err(UseCaseError::Gateway(anyhow::anyhow!(
                    "gateway {operation} timed out after {:?}",
                    self.gateway_timeout
                )))
            }
        }
    }
}

fn to_model(entity: PaymentEntity) -> UseCaseResult<PaymentModel> {
    PaymentModel::try_from(entity).map_err(UseCaseError::Store)
}
