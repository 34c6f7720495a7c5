use std::sync::Arc;

use application::{auth::AuthService, usecases::carts::CartUseCase};
use axum::{
    Extension, Json, Router, extract::State, middleware::from_fn_with_state,
    response::IntoResponse, routing::get,
};
use domain::{
    repositories::{carts::CartRepository, products::ProductCatalog},
    value_objects::{carts::AddToCartModel, iam::Identity},
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{carts::CartPostgres, products::ProductPostgres},
};

use crate::{auth::authorize, axum_http::error_responses::AppError};

pub fn routes(db_pool: Arc<PgPoolSquad>, auth: Arc<AuthService>) -> Router {
    let cart_repository = CartPostgres::new(Arc::clone(&db_pool));
    let product_catalog = ProductPostgres::new(Arc::clone(&db_pool));
    let usecase = CartUseCase::new(Arc::new(cart_repository), Arc::new(product_catalog));

    Router::new()
        .route(
            "/",
            get(find_cart::<CartPostgres, ProductPostgres>)
                .post(add_or_update::<CartPostgres, ProductPostgres>),
        )
        .route_layer(from_fn_with_state(auth, authorize))
        .with_state(Arc::new(usecase))
}

pub async fn find_cart<C, P>(
    State(usecase): State<Arc<CartUseCase<C, P>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    C: CartRepository + Send + Sync + 'static,
    P: ProductCatalog + Send + Sync + 'static,
{
    let cart = usecase.find_cart(identity.user_id).await?;
    Ok(Json(cart))
}

/// Sets a product's quantity in the cart; zero removes the line.
pub async fn add_or_update<C, P>(
    State(usecase): State<Arc<CartUseCase<C, P>>>,
    Extension(identity): Extension<Identity>,
    Json(model): Json<AddToCartModel>,
) -> Result<impl IntoResponse, AppError>
where
    C: CartRepository + Send + Sync + 'static,
    P: ProductCatalog + Send + Sync + 'static,
{
    let cart = usecase.add_or_update(&identity, model).await?;
    Ok(Json(cart))
}
