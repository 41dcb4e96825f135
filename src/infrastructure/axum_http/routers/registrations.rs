use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::repositories::registrations::RegistrationRepository;
use crate::domain::value_objects::payments::StatusPollResponse;
use crate::domain::value_objects::registrations::{
    RegistrationUploads, SubmitRegistrationModel, SubmitRegistrationResponse, UploadedFile,
};
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::registrations::RegistrationPostgres,
};
use crate::payments::pix_client::PixClient;
use crate::usecases::payment_reconciliation::{
    NoApprovalSideEffect, PaymentReconciliationUseCase, PixGateway,
};
use crate::usecases::registrations::RegistrationUseCase;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let registration_usecase = build_registration_usecase(
        db_pool,
        pix_client,
        config.pricing.registration_amount_minor,
    );

    Router::new()
        .route("/", post(submit))
        .route("/status", get(status_by_cpf))
        .route("/:id/payment", get(payment_view))
        .route("/:id/payment/status", get(poll_status))
        .with_state(Arc::new(registration_usecase))
}

/// Also used by the admin router for authenticated upload downloads.
pub fn build_registration_usecase(
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
    amount_minor: i64,
) -> RegistrationUseCase<RegistrationPostgres, RegistrationPostgres, PixClient> {
    let registration_repo = Arc::new(RegistrationPostgres::new(
        Arc::clone(&db_pool),
        amount_minor,
    ));
    let reconciliation = PaymentReconciliationUseCase::new(
        Arc::clone(&registration_repo),
        Arc::clone(&pix_client),
        Arc::new(NoApprovalSideEffect),
    );
    RegistrationUseCase::new(registration_repo, pix_client, reconciliation, amount_minor)
}

#[derive(Debug, Deserialize)]
pub struct CpfQuery {
    pub cpf: Option<String>,
}

pub async fn submit<R, P, G>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, P, G>>>,
    multipart: Multipart,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    let model = match read_submission(multipart).await {
        Ok(model) => model,
        Err(message) => return respond_error(StatusCode::BAD_REQUEST, &message),
    };

    match registration_usecase.submit(model).await {
        Ok(registration_id) => (
            StatusCode::CREATED,
            Json(SubmitRegistrationResponse {
                ok: true,
                registration_id,
            }),
        )
            .into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn payment_view<R, P, G>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, P, G>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match registration_usecase.payment_view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn poll_status<R, P, G>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, P, G>>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    match registration_usecase.poll_status(id).await {
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

pub async fn status_by_cpf<R, P, G>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, P, G>>>,
    Query(query): Query<CpfQuery>,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    let cpf = query.cpf.unwrap_or_default();
    match registration_usecase.status_by_cpf(&cpf).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

/// Collects the multipart form into the submission model. Unknown parts
/// are ignored; upload parts keep their client-reported content type.
async fn read_submission(mut multipart: Multipart) -> Result<SubmitRegistrationModel, String> {
    let mut full_name = String::new();
    let mut gender = String::new();
    let mut birth_date = String::new();
    let mut whatsapp = String::new();
    let mut emergency_contact = String::new();
    let mut address = String::new();
    let mut quote = String::new();
    let mut cpf = String::new();
    let mut guardian_confirmed = false;
    let mut guardian_name = None;
    let mut uploads = RegistrationUploads::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("Invalid multipart payload: {err}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" | "photo" | "devotion_photo" => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| format!("Failed to read upload '{name}': {err}"))?
                    .to_vec();
                let upload = Some(UploadedFile { bytes, mime });
                match name.as_str() {
                    "document" => uploads.document = upload,
                    "photo" => uploads.photo = upload,
                    _ => uploads.devotion_photo = upload,
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| format!("Failed to read field '{name}': {err}"))?;
                match name.as_str() {
                    "full_name" => full_name = value,
                    "gender" => gender = value,
                    "birth_date" => birth_date = value,
                    "whatsapp" => whatsapp = value,
                    "emergency_contact" => emergency_contact = value,
                    "address" => address = value,
                    "quote" => quote = value,
                    "cpf" => cpf = value,
                    "guardian_confirmed" => {
                        guardian_confirmed = matches!(value.as_str(), "true" | "on" | "1")
                    }
                    "guardian_name" => guardian_name = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(SubmitRegistrationModel {
        full_name,
        gender,
        birth_date,
        whatsapp,
        emergency_contact,
        address,
        quote,
        cpf,
        guardian_confirmed,
        guardian_name,
        uploads,
    })
}
