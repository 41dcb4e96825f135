use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::auth::{self, USER_SESSION_COOKIE};
use crate::domain::repositories::admins::AdminRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::accounts::{
    AuthenticatedUser, LoginModel, RegisterUserModel, SessionProfileDto,
};
use crate::infrastructure::axum_http::error_responses::respond_error;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{admins::AdminPostgres, users::UserPostgres},
};
use crate::usecases::accounts::AccountsUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repo = UserPostgres::new(Arc::clone(&db_pool));
    let admin_repo = AdminPostgres::new(Arc::clone(&db_pool));
    let accounts_usecase = AccountsUseCase::new(Arc::new(user_repo), Arc::new(admin_repo));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(Arc::new(accounts_usecase))
}

fn session_response(
    status: StatusCode,
    jar: CookieJar,
    user: AuthenticatedUser,
) -> axum::response::Response {
    let token = match auth::issue_user_session(&user) {
        Ok(token) => token,
        Err(_) => {
            return respond_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &"Failed to issue session",
            );
        }
    };

    let jar = jar.add(auth::session_cookie(USER_SESSION_COOKIE, token));
    (
        status,
        jar,
        Json(SessionProfileDto {
            ok: true,
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        }),
    )
        .into_response()
}

pub async fn register<U, A>(
    State(accounts_usecase): State<Arc<AccountsUseCase<U, A>>>,
    jar: CookieJar,
    Json(model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: AdminRepository + Send + Sync + 'static,
{
    match accounts_usecase.register_user(model).await {
        Ok(user) => session_response(StatusCode::CREATED, jar, user),
        Err(err) => respond_error(err.status_code(), &err),
    }
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
    match accounts_usecase.login_user(model).await {
        Ok(user) => session_response(StatusCode::OK, jar, user),
        Err(err) => respond_error(err.status_code(), &err),
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(auth::removal_cookie(USER_SESSION_COOKIE));
    (jar, Json(json!({ "ok": true })))
}
