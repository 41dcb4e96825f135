use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, ADMIN_SESSION_COOKIE, AdminSession};
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::admins::AdminRepository;
use crate::domain::repositories::cart::CartRepository;
use crate::domain::repositories::donations::DonationRepository;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::repositories::registrations::RegistrationRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::accounts::{CreateAdminModel, LoginModel, SessionProfileDto};
use crate::domain::value_objects::admin_reports::PurgeResultDto;
use crate::domain::value_objects::registrations::UploadKind;
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::axum_http::routers::{
    orders::build_order_usecase, registrations::build_registration_usecase,
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        admins::AdminPostgres, cart::CartPostgres, donations::DonationPostgres,
        orders::OrderPostgres, registrations::RegistrationPostgres, users::UserPostgres,
    },
};
use crate::payments::pix_client::PixClient;
use crate::usecases::accounts::AccountsUseCase;
use crate::usecases::admin::AdminUseCase;
use crate::usecases::orders::OrderUseCase;
use crate::usecases::payment_reconciliation::{ApprovalSideEffect, PixGateway};
use crate::usecases::registrations::RegistrationUseCase;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let accounts_usecase = Arc::new(AccountsUseCase::new(
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(AdminPostgres::new(Arc::clone(&db_pool))),
    ));
    let session_router = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/admins", post(create_admin))
        .with_state(accounts_usecase);

    let admin_usecase = Arc::new(AdminUseCase::new(
        Arc::new(RegistrationPostgres::new(
            Arc::clone(&db_pool),
            config.pricing.registration_amount_minor,
        )),
        Arc::new(OrderPostgres::new(Arc::clone(&db_pool))),
        Arc::new(DonationPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CartPostgres::new(Arc::clone(&db_pool))),
        config.pricing.registration_amount_minor,
        config.pricing.fee_rate,
    ));
    let reports_router = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/registrations", get(paid_registrations))
        .route("/orders", get(orders_overview))
        .route("/donations", get(donations_overview))
        .route("/orders/:id/approve", post(approve_order))
        .route("/orders/purge-unpaid", post(purge_unpaid))
        .with_state(admin_usecase);

    let order_usecase = Arc::new(build_order_usecase(
        Arc::clone(&db_pool),
        Arc::clone(&pix_client),
    ));
    let refresh_router = Router::new()
        .route("/orders/refresh", post(refresh_orders))
        .with_state(order_usecase);

    let registration_usecase = Arc::new(build_registration_usecase(
        db_pool,
        pix_client,
        config.pricing.registration_amount_minor,
    ));
    let files_router = Router::new()
        .route("/registrations/:id/files/:kind", get(download_upload))
        .with_state(registration_usecase);

    session_router
        .merge(reports_router)
        .merge(refresh_router)
        .merge(files_router)
}

pub async fn login<U, A>(
    State(accounts_usecase): State<Arc<AccountsUseCase<U, A>>>,
    jar: CookieJar,
    Json(model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: AdminRepository + Send + Sync + 'static,
{
    let admin = match accounts_usecase.login_admin(model).await {
        Ok(admin) => admin,
        Err(err) => return respond_error(err.status_code(), &err),
    };

    let token = match auth::issue_admin_session(&admin) {
        Ok(token) => token,
        Err(_) => {
            return respond_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &"Failed to issue session",
            );
        }
    };

    let jar = jar.add(auth::session_cookie(ADMIN_SESSION_COOKIE, token));
    (
        jar,
        Json(SessionProfileDto {
            ok: true,
            id: admin.id,
            full_name: admin.full_name,
            email: admin.email,
        }),
    )
        .into_response()
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(auth::removal_cookie(ADMIN_SESSION_COOKIE));
    (jar, Json(json!({ "ok": true })))
}

pub async fn create_admin<U, A>(
    State(accounts_usecase): State<Arc<AccountsUseCase<U, A>>>,
    _admin: AdminSession,
    Json(model): Json<CreateAdminModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: AdminRepository + Send + Sync + 'static,
{
    match accounts_usecase.create_admin(model).await {
        Ok(admin_id) => (
            StatusCode::CREATED,
            Json(json!({ "ok": true, "admin_id": admin_id })),
        )
            .into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn dashboard<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.dashboard().await {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn paid_registrations<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.paid_registrations().await {
        Ok(rows) => Json(json!({ "ok": true, "registrations": rows })).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn orders_overview<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.orders_overview().await {
        Ok(overview) => Json(overview).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn donations_overview<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.donations_overview().await {
        Ok(overview) => Json(overview).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn approve_order<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.approve_order(order_id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn purge_unpaid<R, O, D, C>(
    State(admin_usecase): State<Arc<AdminUseCase<R, O, D, C>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    match admin_usecase.purge_unpaid_orders().await {
        Ok(removed) => Json(PurgeResultDto { ok: true, removed }).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn refresh_orders<O, P, G, E>(
    State(order_usecase): State<Arc<OrderUseCase<O, P, G, E>>>,
    _admin: AdminSession,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    match order_usecase.refresh_all().await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn download_upload<R, P, G>(
    State(registration_usecase): State<Arc<RegistrationUseCase<R, P, G>>>,
    _admin: AdminSession,
    Path((id, kind)): Path<(Uuid, String)>,
) -> impl IntoResponse
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    let Some(kind) = UploadKind::from_str(&kind) else {
        return respond_error(StatusCode::BAD_REQUEST, &"Unknown upload kind");
    };

    match registration_usecase.find_upload(id, kind).await {
        Ok((bytes, mime)) => ([(header::CONTENT_TYPE, mime)], bytes).into_response(),
        Err(err) => respond_error(err.status_code(), &err),
    }
}
