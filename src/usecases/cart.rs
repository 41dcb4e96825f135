use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::UserSession;
use crate::domain::entities::cart_items::{CartItemEntity, InsertCartItemEntity};
use crate::domain::repositories::cart::CartRepository;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::value_objects::cart::{
    AddCartItemModel, CartLineDto, CartViewDto, UpdateCartItemModel, clamp_qty,
};
use crate::domain::value_objects::catalog;
use crate::domain::value_objects::enums::shirt_sizes::ShirtSize;
use crate::domain::value_objects::money;
use crate::domain::value_objects::orders::{NewOrderLine, UpsertPendingOrder};
use crate::domain::value_objects::payments::{ChargeRequest, NewCharge, ORDER_DESCRIPTION};
use crate::usecases::payment_reconciliation::PixGateway;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Unknown product")]
    UnknownProduct,
    #[error("Invalid size")]
    InvalidSize,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Cart item not found")]
    ItemNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CartError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CartError::UnknownProduct | CartError::InvalidSize | CartError::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
            CartError::ItemNotFound => StatusCode::NOT_FOUND,
            CartError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type CartResult<T> = std::result::Result<T, CartError>;

pub struct CartUseCase<C, O, G>
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    cart_repo: Arc<C>,
    order_repo: Arc<O>,
    pix_gateway: Arc<G>,
}

impl<C, O, G> CartUseCase<C, O, G>
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    pub fn new(cart_repo: Arc<C>, order_repo: Arc<O>, pix_gateway: Arc<G>) -> Self {
        Self {
            cart_repo,
            order_repo,
            pix_gateway,
        }
    }

    pub async fn add_item(&self, user_id: Uuid, model: AddCartItemModel) -> CartResult<()> {
        let product = catalog::find_product(&model.product_id).ok_or(CartError::UnknownProduct)?;
        let size = ShirtSize::from_str(&model.size).ok_or(CartError::InvalidSize)?;
        let qty = clamp_qty(model.qty);

        self.cart_repo
            .upsert_item(InsertCartItemEntity {
                user_id,
                product_id: product.id.to_string(),
                name: product.name.to_string(),
                size: size.to_string(),
                qty,
                price_minor: product.price_minor,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "cart: failed to add item");
                CartError::Internal(err)
            })?;

        info!(%user_id, product_id = %product.id, qty, "cart: item added");
        Ok(())
    }

    pub async fn view(&self, user_id: Uuid) -> CartResult<CartViewDto> {
        let items = self
            .cart_repo
            .list_for_user(user_id)
            .await
            .map_err(CartError::Internal)?;

        let mut lines = Vec::with_capacity(items.len());
        let mut total_minor: i64 = 0;
        for item in items {
            let line_total = current_price(&item) as i64 * item.qty as i64;
            total_minor += line_total;
            lines.push(to_line(item, line_total));
        }

        Ok(CartViewDto {
            ok: true,
            items: lines,
            total: money::format_brl(total_minor),
            total_minor,
        })
    }

    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        model: UpdateCartItemModel,
    ) -> CartResult<()> {
        let size = ShirtSize::from_str(&model.size).ok_or(CartError::InvalidSize)?;
        let qty = clamp_qty(model.qty);

        let updated = self
            .cart_repo
            .update_item(user_id, item_id, size.to_string(), qty)
            .await
            .map_err(CartError::Internal)?;
        if !updated {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> CartResult<()> {
        let removed = self
            .cart_repo
            .delete_item(user_id, item_id)
            .await
            .map_err(CartError::Internal)?;
        if !removed {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    pub async fn count(&self, user_id: Uuid) -> CartResult<i64> {
        self.cart_repo
            .count_for_user(user_id)
            .await
            .map_err(CartError::Internal)
    }

    /// Turns the cart into the user's single pending order: a fresh PIX
    /// charge for the current total, and the order's items replaced with
    /// the cart's, all priced at today's catalog prices.
    pub async fn checkout(&self, session: &UserSession) -> CartResult<Uuid> {
        let items = self
            .cart_repo
            .list_for_user(session.user_id)
            .await
            .map_err(CartError::Internal)?;
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let mut total_minor: i64 = 0;
        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let price_minor = current_price(item);
            total_minor += price_minor as i64 * item.qty as i64;
            lines.push(NewOrderLine {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                size: item.size.clone(),
                qty: item.qty,
                price_minor,
            });
        }

        let payment = self
            .pix_gateway
            .create_payment(ChargeRequest {
                amount_minor: total_minor,
                description: ORDER_DESCRIPTION.to_string(),
                payer_name: session.full_name.clone(),
                payer_cpf: session.cpf.clone(),
            })
            .await
            .map_err(|err| {
                error!(user_id = %session.user_id, error = ?err, "cart: failed to create PIX charge for checkout");
                CartError::Internal(err)
            })?;

        let order_id = self
            .order_repo
            .upsert_pending_order(UpsertPendingOrder {
                user_id: session.user_id,
                total_minor,
                charge: NewCharge::from(payment),
                items: lines,
            })
            .await
            .map_err(|err| {
                error!(user_id = %session.user_id, db_error = ?err, "cart: failed to persist order");
                CartError::Internal(err)
            })?;

        info!(user_id = %session.user_id, %order_id, total_minor, "cart: checkout created pending order");
        Ok(order_id)
    }

    pub async fn cancel_pending(&self, user_id: Uuid) -> CartResult<bool> {
        let canceled = self
            .order_repo
            .cancel_pending(user_id)
            .await
            .map_err(CartError::Internal)?;
        if canceled {
            info!(%user_id, "cart: pending order canceled");
        }
        Ok(canceled)
    }
}

/// Current catalog price, or the price stored at add time for products that
/// have since been delisted.
fn current_price(item: &CartItemEntity) -> i32 {
    catalog::find_product(&item.product_id)
        .map(|product| product.price_minor)
        .unwrap_or(item.price_minor)
}

fn to_line(item: CartItemEntity, line_total_minor: i64) -> CartLineDto {
    let product = catalog::find_product(&item.product_id);
    CartLineDto {
        id: item.id,
        product_id: item.product_id,
        name: item.name,
        size: item.size,
        qty: item.qty,
        image: product.map(|p| p.image),
        unit_price: money::format_brl(
            product
                .map(|p| p.price_minor as i64)
                .unwrap_or(item.price_minor as i64),
        ),
        line_total: money::format_brl(line_total_minor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::cart::MockCartRepository;
    use crate::domain::repositories::orders::MockOrderRepository;
    use crate::payments::pix_client::PixPaymentData;
    use crate::usecases::payment_reconciliation::MockPixGateway;
    use chrono::Utc;

    fn session() -> UserSession {
        UserSession {
            user_id: Uuid::new_v4(),
            full_name: "Ana Maria".to_string(),
            cpf: Some("52998224725".to_string()),
        }
    }

    fn usecase(
        cart_repo: MockCartRepository,
        order_repo: MockOrderRepository,
        gateway: MockPixGateway,
    ) -> CartUseCase<MockCartRepository, MockOrderRepository, MockPixGateway> {
        CartUseCase::new(Arc::new(cart_repo), Arc::new(order_repo), Arc::new(gateway))
    }

    fn cart_item(product_id: &str, qty: i32, stored_price: i32) -> CartItemEntity {
        CartItemEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            name: "Saints tee".to_string(),
            size: "M".to_string(),
            qty,
            price_minor: stored_price,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn add_item_uses_catalog_name_and_price_and_clamps_qty() {
        let user_id = Uuid::new_v4();
        let mut cart_repo = MockCartRepository::new();

        cart_repo
            .expect_upsert_item()
            .withf(move |item| {
                item.user_id == user_id
                    && item.product_id == "saints-bw-regular"
                    && item.name == "Saints B&W Tee (regular)"
                    && item.price_minor == 5800
                    && item.size == "M"
                    && item.qty == 99
            })
            .times(1)
            .returning(|_| Box::pin(async move { Ok(()) }));

        usecase(cart_repo, MockOrderRepository::new(), MockPixGateway::new())
            .add_item(
                user_id,
                AddCartItemModel {
                    product_id: "saints-bw-regular".to_string(),
                    size: "m".to_string(),
                    qty: Some(500),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_item_rejects_unknown_product_and_size() {
        let usecase = usecase(
            MockCartRepository::new(),
            MockOrderRepository::new(),
            MockPixGateway::new(),
        );

        let unknown = usecase
            .add_item(
                Uuid::new_v4(),
                AddCartItemModel {
                    product_id: "mug".to_string(),
                    size: "M".to_string(),
                    qty: Some(1),
                },
            )
            .await
            .unwrap_err();
        let bad_size = usecase
            .add_item(
                Uuid::new_v4(),
                AddCartItemModel {
                    product_id: "saints-bw-regular".to_string(),
                    size: "XXL".to_string(),
                    qty: Some(1),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(unknown, CartError::UnknownProduct));
        assert!(matches!(bad_size, CartError::InvalidSize));
    }

    #[tokio::test]
    async fn checkout_with_empty_cart_is_rejected() {
        let mut cart_repo = MockCartRepository::new();
        cart_repo
            .expect_list_for_user()
            .returning(|_| Box::pin(async move { Ok(Vec::new()) }));

        let err = usecase(cart_repo, MockOrderRepository::new(), MockPixGateway::new())
            .checkout(&session())
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::EmptyCart));
    }

    #[tokio::test]
    async fn checkout_totals_current_prices_and_upserts_the_pending_order() {
        let session = session();
        let order_id = Uuid::new_v4();

        // Stored price 100 is stale: the catalog now says 5800. The
        // delisted product keeps its stored 4200.
        let items = vec![
            cart_item("saints-bw-regular", 2, 100),
            cart_item("retired-product", 1, 4200),
        ];
        let expected_total: i64 = 5800 * 2 + 4200;

        let mut cart_repo = MockCartRepository::new();
        let mut order_repo = MockOrderRepository::new();
        let mut gateway = MockPixGateway::new();

        cart_repo.expect_list_for_user().returning(move |_| {
            let items = items.clone();
            Box::pin(async move { Ok(items) })
        });
        gateway
            .expect_create_payment()
            .withf(move |request| {
                request.amount_minor == expected_total
                    && request.description == ORDER_DESCRIPTION
                    && request.payer_cpf.as_deref() == Some("52998224725")
            })
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(PixPaymentData {
                        payment_id: "pay-9".to_string(),
                        qr_code: Some("qr".to_string()),
                        qr_base64: None,
                        ticket_url: None,
                    })
                })
            });
        let expected_user = session.user_id;
        order_repo
            .expect_upsert_pending_order()
            .withf(move |order| {
                order.user_id == expected_user
                    && order.total_minor == expected_total
                    && order.charge.payment_id == "pay-9"
                    && order.items.len() == 2
                    && order.items[0].price_minor == 5800
                    && order.items[1].price_minor == 4200
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(order_id) }));

        let result = usecase(cart_repo, order_repo, gateway)
            .checkout(&session)
            .await
            .unwrap();

        assert_eq!(result, order_id);
    }

    #[tokio::test]
    async fn view_prices_lines_at_current_catalog_prices() {
        let mut cart_repo = MockCartRepository::new();
        let items = vec![cart_item("saints-bw-regular", 2, 100)];

        cart_repo.expect_list_for_user().returning(move |_| {
            let items = items.clone();
            Box::pin(async move { Ok(items) })
        });

        let view = usecase(cart_repo, MockOrderRepository::new(), MockPixGateway::new())
            .view(Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(view.total_minor, 11_600);
        assert_eq!(view.total, "R$ 116,00");
        assert_eq!(view.items[0].unit_price, "R$ 58,00");
        assert_eq!(view.items[0].line_total, "R$ 116,00");
    }

    #[tokio::test]
    async fn update_item_surfaces_not_found() {
        let mut cart_repo = MockCartRepository::new();
        cart_repo
            .expect_update_item()
            .returning(|_, _, _, _| Box::pin(async move { Ok(false) }));

        let err = usecase(cart_repo, MockOrderRepository::new(), MockPixGateway::new())
            .update_item(
                Uuid::new_v4(),
                Uuid::new_v4(),
                UpdateCartItemModel {
                    size: "G".to_string(),
                    qty: Some(2),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::ItemNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
