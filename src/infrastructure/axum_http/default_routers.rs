use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use diesel::RunQueryDsl;
use serde_json::json;
use tracing::error;

use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "NOT_FOUND").into_response()
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

pub async fn db_ping(State(db_pool): State<Arc<PgPoolSquad>>) -> impl IntoResponse {
    let ping = || -> anyhow::Result<()> {
        let mut conn = db_pool.get()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    };

    match ping() {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => {
            error!(error = ?err, "health: database ping failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false }))).into_response()
        }
    }
}
