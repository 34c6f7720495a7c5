use std::sync::Arc;

use chrono::Utc;
use domain::{
    entities::cart_items::{CartItemEntity, InsertCartItemEntity},
    repositories::{carts::CartRepository, products::ProductCatalog},
    value_objects::{
        carts::{AddToCartModel, CartDto, CartItemDto, cart_total},
        iam::Identity,
    },
};
use tracing::info;

use crate::errors::{UseCaseError, UseCaseResult, store_error};

pub struct CartUseCase<C, P>
where
    C: CartRepository + Send + Sync + 'static,
    P: ProductCatalog + Send + Sync + 'static,
{
    cart_repository: Arc<C>,
    product_catalog: Arc<P>,
}

impl<C, P> CartUseCase<C, P>
where
    C: CartRepository + Send + Sync + 'static,
    P: ProductCatalog + Send + Sync + 'static,
{
    pub fn new(cart_repository: Arc<C>, product_catalog: Arc<P>) -> Self {
        Self {
            cart_repository,
            product_catalog,
        }
    }

    pub async fn find_cart(&self, user_id: i32) -> UseCaseResult<CartDto> {
        let items = self.find_lines(user_id).await?;
        Ok(to_dto(items))
    }

    /// Raw cart lines in insertion order.
    pub async fn find_lines(&self, user_id: i32) -> UseCaseResult<Vec<CartItemEntity>> {
        self.cart_repository
            .find_items(user_id)
            .await
            .map_err(store_error("carts: failed to load cart items"))
    }

    /// Sets the quantity of a product in the caller's cart.
    ///
    /// A quantity below one removes an existing line. New lines snapshot the
    /// product's name, image, price and seller; the price is never refreshed.
    pub async fn add_or_update(
        &self,
        identity: &Identity,
        model: AddToCartModel,
    ) -> UseCaseResult<CartDto> {
        let user_id = identity.user_id;
        if model.product_id <= 0 {
            return Err(UseCaseError::Validation(
                "please provide a valid product id".to_string(),
            ));
        }

        let existing = self
            .cart_repository
            .find_item(user_id, model.product_id)
            .await
            .map_err(store_error("carts: failed to load cart item"))?;

        match existing {
            Some(line) if model.qty < 1 => {
                self.cart_repository
                    .delete_item(line.id)
                    .await
                    .map_err(store_error("carts: failed to delete cart item"))?;
                info!(user_id, product_id = model.product_id, "carts: line removed");
            }
            Some(line) => {
                self.cart_repository
                    .update_qty(line.id, model.qty)
                    .await
                    .map_err(store_error("carts: failed to update cart item"))?;
                info!(user_id, product_id = model.product_id, qty = model.qty, "carts: line updated");
            }
            None => {
                if model.qty < 1 {
                    return Err(UseCaseError::Validation(
                        "quantity must be at least 1".to_string(),
                    ));
                }

                let product = self
                    .product_catalog
                    .find_by_id(model.product_id)
                    .await
                    .map_err(store_error("carts: failed to load product"))?
                    .ok_or_else(|| UseCaseError::NotFound("product".to_string()))?;

                let now = Utc::now();
                self.cart_repository
                    .insert_item(InsertCartItemEntity {
                        user_id,
                        product_id: product.id,
                        name: product.name,
                        image_url: product.image_url,
                        price: product.price,
                        qty: model.qty,
                        seller_id: product.user_id,
                        created_at: now,
                        updated_at: now,
                    })
                    .await
                    .map_err(store_error("carts: failed to insert cart item"))?;
                info!(user_id, product_id = model.product_id, qty = model.qty, "carts: line added");
            }
        }

        self.find_cart(user_id).await
    }
}

fn to_dto(items: Vec<CartItemEntity>) -> CartDto {
    let total = cart_total(&items);
    CartDto {
        items: items.into_iter().map(CartItemDto::from).collect(),
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{
        entities::products::ProductEntity,
        repositories::{carts::MockCartRepository, products::MockProductCatalog},
        value_objects::enums::user_roles::Role,
    };
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn identity() -> Identity {
        Identity {
            user_id: 3,
            email: "buyer@example.com".to_string(),
            role: Role::Buyer,
        }
    }

    fn line(id: i32, product_id: i32, price: Decimal, qty: i32) -> CartItemEntity {
        let now = Utc::now();
        CartItemEntity {
            id,
            user_id: 3,
            product_id,
            name: format!("product {product_id}"),
            image_url: String::new(),
            price,
            qty,
            seller_id: 9,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(id: i32, price: Decimal) -> ProductEntity {
        let now = Utc::now();
        ProductEntity {
            id,
            category_id: 1,
            name: "Brass lamp".to_string(),
            description: String::new(),
            image_url: "https://img.example.com/lamp.png".to_string(),
            price,
            stock: 5,
            user_id: 9,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn empty_cart_totals_zero() {
        let mut carts = MockCartRepository::new();
        carts.expect_find_items().returning(|_| Ok(vec![]));

        let cart = CartUseCase::new(Arc::new(carts), Arc::new(MockProductCatalog::new()))
            .find_cart(3)
            .await
            .unwrap();

        assert!(cart.items.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn total_sums_price_times_qty() {
        let mut carts = MockCartRepository::new();
        carts.expect_find_items().with(eq(3)).returning(|_| {
            Ok(vec![
                line(1, 10, Decimal::new(1000, 2), 2),
                line(2, 11, Decimal::new(250, 2), 3),
            ])
        });

        let cart = CartUseCase::new(Arc::new(carts), Arc::new(MockProductCatalog::new()))
            .find_cart(3)
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total, Decimal::new(2750, 2));
    }

    #[tokio::test]
    async fn zero_qty_removes_the_line_and_the_total_excludes_it() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_item()
            .with(eq(3), eq(10))
            .returning(|_, _| Ok(Some(line(1, 10, Decimal::new(1000, 2), 2))));
        carts
            .expect_delete_item()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        carts.expect_update_qty().never();
        carts
            .expect_find_items()
            .returning(|_| Ok(vec![line(2, 11, Decimal::new(250, 2), 3)]));

        let cart = CartUseCase::new(Arc::new(carts), Arc::new(MockProductCatalog::new()))
            .add_or_update(
                &identity(),
                AddToCartModel {
                    product_id: 10,
                    qty: 0,
                },
            )
            .await
            .unwrap();

        assert!(cart.items.iter().all(|item| item.product_id != 10));
        assert_eq!(cart.total, Decimal::new(750, 2));
    }

    #[tokio::test]
    async fn existing_line_gets_new_qty_without_repricing() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_item()
            .returning(|_, _| Ok(Some(line(1, 10, Decimal::new(1000, 2), 2))));
        carts
            .expect_update_qty()
            .with(eq(1), eq(5))
            .times(1)
            .returning(|_, _| Ok(()));
        carts
            .expect_find_items()
            .returning(|_| Ok(vec![line(1, 10, Decimal::new(1000, 2), 5)]));

        let mut catalog = MockProductCatalog::new();
        catalog.expect_find_by_id().never();

        let cart = CartUseCase::new(Arc::new(carts), Arc::new(catalog))
            .add_or_update(
                &identity(),
                AddToCartModel {
                    product_id: 10,
                    qty: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(cart.total, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn new_line_snapshots_the_product() {
        let mut carts = MockCartRepository::new();
        carts.expect_find_item().returning(|_, _| Ok(None));
        carts
            .expect_insert_item()
            .withf(|item| {
                item.user_id == 3
                    && item.product_id == 10
                    && item.name == "Brass lamp"
                    && item.price == Decimal::new(1000, 2)
                    && item.seller_id == 9
                    && item.qty == 2
            })
            .times(1)
            .returning(|item| Ok(line(1, item.product_id, item.price, item.qty)));
        carts
            .expect_find_items()
            .returning(|_| Ok(vec![line(1, 10, Decimal::new(1000, 2), 2)]));

        let mut catalog = MockProductCatalog::new();
        catalog
            .expect_find_by_id()
            .with(eq(10))
            .returning(|id| Ok(Some(product(id, Decimal::new(1000, 2)))));

        let cart = CartUseCase::new(Arc::new(carts), Arc::new(catalog))
            .add_or_update(
                &identity(),
                AddToCartModel {
                    product_id: 10,
                    qty: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn invalid_new_lines_are_rejected() {
        let mut carts = MockCartRepository::new();
        carts.expect_find_item().returning(|_, _| Ok(None));
        carts.expect_insert_item().never();

        let mut catalog = MockProductCatalog::new();
        catalog.expect_find_by_id().returning(|_| Ok(None));

        let usecase = CartUseCase::new(Arc::new(carts), Arc::new(catalog));

        let bad_id = usecase
            .add_or_update(&identity(), AddToCartModel { product_id: 0, qty: 1 })
            .await
            .unwrap_err();
        let bad_qty = usecase
            .add_or_update(&identity(), AddToCartModel { product_id: 10, qty: 0 })
            .await
            .unwrap_err();
        let unknown = usecase
            .add_or_update(&identity(), AddToCartModel { product_id: 99, qty: 1 })
            .await
            .unwrap_err();

        assert!(matches!(bad_id, UseCaseError::Validation(_)));
        assert!(matches!(bad_qty, UseCaseError::Validation(_)));
        assert!(matches!(unknown, UseCaseError::NotFound(_)));
    }
}
