use std::sync::Arc;

use application::{auth::AuthService, usecases::orders::OrderUseCase};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};
use domain::{
    repositories::{carts::CartRepository, orders::OrderRepository},
    value_objects::iam::Identity,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{carts::CartPostgres, orders::OrderPostgres},
};

use crate::{auth::authorize, axum_http::error_responses::AppError};

pub fn routes(db_pool: Arc<PgPoolSquad>, auth: Arc<AuthService>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let cart_repository = CartPostgres::new(Arc::clone(&db_pool));
    let usecase = OrderUseCase::new(Arc::new(order_repository), Arc::new(cart_repository));

    Router::new()
        .route("/", get(list_orders::<OrderPostgres, CartPostgres>))
        .route("/:order_id", get(get_order::<OrderPostgres, CartPostgres>))
        .route_layer(from_fn_with_state(auth, authorize))
        .with_state(Arc::new(usecase))
}

pub async fn list_orders<O, C>(
    State(usecase): State<Arc<OrderUseCase<O, C>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    O: OrderRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let orders = usecase.list_orders(&identity).await?;
    Ok(Json(orders))
}

pub async fn get_order<O, C>(
    State(usecase): State<Arc<OrderUseCase<O, C>>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError>
where
    O: OrderRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let order = usecase.get_order(&identity, order_id).await?;
    Ok(Json(order))
}
