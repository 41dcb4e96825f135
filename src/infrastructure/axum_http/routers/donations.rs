use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::domain::repositories::donations::DonationRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::donations::{CreateDonationModel, CreateDonationResponse};
use crate::domain::value_objects::payments::StatusPollResponse;
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::donations::DonationPostgres,
};
use crate::payments::pix_client::PixClient;
use crate::usecases::donations::DonationUseCase;
use crate::usecases::payment_reconciliation::{
    NoApprovalSideEffect, PaymentReconciliationUseCase, PixGateway,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, pix_client: Arc<PixClient>) -> Router {
    let donation_repo = Arc::new(DonationPostgres::new(Arc::clone(&db_pool)));
    let reconciliation = PaymentReconciliationUseCase::new(
        Arc::clone(&donation_repo),
        Arc::clone(&pix_client),
        Arc::new(NoApprovalSideEffect),
    );
    let donation_usecase = DonationUseCase::new(donation_repo, pix_client, reconciliation);

    Router::new()
        .route("/", post(create))
        .route("/:id/payment", get(payment_view))
        .route("/:id/payment/status", get(poll_status))
        .with_state(Arc::new(donation_usecase))
}

pub async fn create<D, P, G>(
    State(donation_usecase): State<Arc<DonationUseCase<D, P, G>>>,
    Json(model): Json<CreateDonationModel>,
) -> impl IntoResponse
where
    D: DonationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match donation_usecase.create(model).await {
        Ok(donation_id) => (
            StatusCode::CREATED,
            Json(CreateDonationResponse {
                ok: true,
                donation_id,
            }),
        )
            .into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn payment_view<D, P, G>(
    State(donation_usecase): State<Arc<DonationUseCase<D, P, G>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    D: DonationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match donation_usecase.payment_view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn poll_status<D, P, G>(
    State(donation_usecase): State<Arc<DonationUseCase<D, P, G>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    D: DonationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match donation_usecase.poll_status(id).await {
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
