use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::auth::UserSession;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::orders::OrderHistoryResponse;
use crate::domain::value_objects::payments::StatusPollResponse;
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{cart::CartPostgres, orders::OrderPostgres},
};
use crate::payments::pix_client::PixClient;
use crate::usecases::orders::OrderUseCase;
use crate::usecases::payment_reconciliation::{
    ApprovalSideEffect, ClearCartOnApproval, PaymentReconciliationUseCase, PixGateway,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, pix_client: Arc<PixClient>) -> Router {
    let order_usecase = build_order_usecase(db_pool, pix_client);

    Router::new()
        .route("/history", get(history))
        .route("/:id/payment", get(payment_view))
        .route("/:id/payment/status", get(poll_status))
        .with_state(Arc::new(order_usecase))
}

/// The order engine with its clear-cart side effect; shared with the admin
/// router's refresh sweep.
pub fn build_order_usecase(
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
) -> OrderUseCase<OrderPostgres, OrderPostgres, PixClient, ClearCartOnApproval<CartPostgres>> {
    let order_repo = Arc::new(OrderPostgres::new(Arc::clone(&db_pool)));
    let cart_repo = Arc::new(CartPostgres::new(Arc::clone(&db_pool)));
    let reconciliation = PaymentReconciliationUseCase::new(
        Arc::clone(&order_repo),
        Arc::clone(&pix_client),
        Arc::new(ClearCartOnApproval::new(cart_repo)),
    );
    OrderUseCase::new(order_repo, pix_client, reconciliation)
}

pub async fn history<O, P, G, E>(
    State(order_usecase): State<Arc<OrderUseCase<O, P, G, E>>>,
    session: UserSession,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    match order_usecase.history(session.user_id).await {
        Ok(orders) => Json(OrderHistoryResponse { ok: true, orders }).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn payment_view<O, P, G, E>(
    State(order_usecase): State<Arc<OrderUseCase<O, P, G, E>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    match order_usecase.payment_view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn poll_status<O, P, G, E>(
    State(order_usecase): State<Arc<OrderUseCase<O, P, G, E>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    match order_usecase.poll_status(id).await {
        Ok(outcome) => Json(StatusPollResponse {
            ok: true,
            status: outcome.status,
            paid: outcome.paid,
            recreated: outcome.recreated,
        })
        .into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}
