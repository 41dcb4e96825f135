use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::domain::repositories::cart::CartRepository;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::value_objects::cart::{AddCartItemModel, CartCountDto, UpdateCartItemModel};
use crate::domain::value_objects::orders::CheckoutResponse;
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{cart::CartPostgres, orders::OrderPostgres},
};
use crate::payments::pix_client::PixClient;
use crate::usecases::cart::CartUseCase;
use crate::usecases::payment_reconciliation::PixGateway;

pub fn routes(db_pool: Arc<PgPoolSquad>, pix_client: Arc<PixClient>) -> Router {
    let cart_repo = CartPostgres::new(Arc::clone(&db_pool));
    let order_repo = OrderPostgres::new(Arc::clone(&db_pool));
    let cart_usecase = CartUseCase::new(Arc::new(cart_repo), Arc::new(order_repo), pix_client);

    Router::new()
        .route("/", get(view))
        .route("/items", post(add_item))
        .route("/items/:id", put(update_item))
        .route("/items/:id", delete(remove_item))
        .route("/count", get(count))
        .route("/checkout", post(checkout))
        .route("/cancel", post(cancel_pending))
        .with_state(Arc::new(cart_usecase))
}

pub async fn view<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.view(session.user_id).await {
        Ok(cart) => Json(cart).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn add_item<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
    Json(model): Json<AddCartItemModel>,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.add_item(session.user_id, model).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "ok": true }))).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn update_item<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
    Path(item_id): Path<Uuid>,
    Json(model): Json<UpdateCartItemModel>,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase
        .update_item(session.user_id, item_id, model)
        .await
    {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn remove_item<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.remove_item(session.user_id, item_id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn count<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.count(session.user_id).await {
        Ok(count) => Json(CartCountDto { ok: true, count }).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn checkout<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.checkout(&session).await {
        Ok(order_id) => (
            StatusCode::CREATED,
            Json(CheckoutResponse { ok: true, order_id }),
        )
            .into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn cancel_pending<C, O, G>(
    State(cart_usecase): State<Arc<CartUseCase<C, O, G>>>,
    session: UserSession,
) -> impl IntoResponse
where
    C: CartRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match cart_usecase.cancel_pending(session.user_id).await {
        Ok(canceled) => Json(json!({ "ok": true, "canceled": canceled })).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}
