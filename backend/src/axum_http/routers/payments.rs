use std::{sync::Arc, time::Duration};

use application::{
    auth::AuthService,
    interfaces::payment_gateway::PaymentGateway,
    usecases::{orders::OrderUseCase, payments::PaymentUseCase},
};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::post,
};
use domain::{
    repositories::{carts::CartRepository, orders::OrderRepository, payments::PaymentRepository},
    value_objects::iam::Identity,
};
use infra::{
    payments::stripe_client::StripeClient,
    postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{carts::CartPostgres, orders::OrderPostgres, payments::PaymentPostgres},
    },
};

use crate::{auth::authorize, axum_http::error_responses::AppError};

const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    auth: Arc<AuthService>,
    gateway: Arc<StripeClient>,
    currency: String,
    gateway_timeout: Duration,
) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let cart_repository = Arc::new(CartPostgres::new(Arc::clone(&db_pool)));
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));

    let order_usecase = OrderUseCase::new(Arc::new(order_repository), Arc::clone(&cart_repository));
    let usecase = PaymentUseCase::new(
        Arc::new(payment_repository),
        cart_repository,
        Arc::new(order_usecase),
        gateway,
        currency,
        gateway_timeout,
    );

    let protected = Router::new()
        .route(
            "/checkout",
            post(checkout::<PaymentPostgres, CartPostgres, OrderPostgres, StripeClient>),
        )
        .route(
            "/confirm",
            post(confirm::<PaymentPostgres, CartPostgres, OrderPostgres, StripeClient>),
        )
        .route_layer(from_fn_with_state(auth, authorize));

    Router::new()
        .route(
            "/webhook",
            post(webhook::<PaymentPostgres, CartPostgres, OrderPostgres, StripeClient>),
        )
        .merge(protected)
        .with_state(Arc::new(usecase))
}

/// Opens, or reuses, the caller's checkout session for the current cart.
pub async fn checkout<P, C, O, G>(
    State(usecase): State<Arc<PaymentUseCase<P, C, O, G>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    P: PaymentRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let session = usecase.initiate_checkout(&identity).await?;
    let status = if session.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(session)))
}

pub async fn confirm<P, C, O, G>(
    State(usecase): State<Arc<PaymentUseCase<P, C, O, G>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    P: PaymentRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let confirmation = usecase.confirm_checkout(&identity).await?;
    Ok(Json(confirmation))
}

/// Gateway notifications. Authenticated by signature, not by bearer token.
pub async fn webhook<P, C, O, G>(
    State(usecase): State<Arc<PaymentUseCase<P, C, O, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    P: PaymentRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("missing {SIGNATURE_HEADER} header")))?;

    usecase.handle_gateway_webhook(&body, signature).await?;
    Ok(StatusCode::OK)
}
