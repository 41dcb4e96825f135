use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::payables::PayableRepository;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        cart::CartPostgres, donations::DonationPostgres, orders::OrderPostgres,
        registrations::RegistrationPostgres,
    },
};
use crate::payments::pix_client::PixClient;
use crate::usecases::payment_reconciliation::{
    ApprovalSideEffect, ClearCartOnApproval, PixGateway,
};
use crate::usecases::webhook::WebhookUseCase;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let registration_payables = Arc::new(RegistrationPostgres::new(
        Arc::clone(&db_pool),
        config.pricing.registration_amount_minor,
    ));
    let donation_payables = Arc::new(DonationPostgres::new(Arc::clone(&db_pool)));
    let order_payables = Arc::new(OrderPostgres::new(Arc::clone(&db_pool)));
    let cart_repo = Arc::new(CartPostgres::new(Arc::clone(&db_pool)));
    let webhook_usecase = WebhookUseCase::new(
        registration_payables,
        donation_payables,
        order_payables,
        pix_client,
        Arc::new(ClearCartOnApproval::new(cart_repo)),
    );

    Router::new()
        .route("/pix", post(handle_pix_notification))
        .route("/pix", get(handle_pix_notification_query))
        .with_state(Arc::new(webhook_usecase))
}

/// The provider posts `{"data": {"id": ...}}`, older hooks send a bare
/// `{"id": ...}`, and the id may arrive as a number or a string.
#[derive(Debug, Default, Deserialize)]
pub struct PixWebhookBody {
    pub data: Option<PixWebhookData>,
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PixWebhookData {
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PixWebhookQuery {
    pub id: Option<String>,
}

fn value_to_id(value: Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Some(id),
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}

fn extract_payment_id(body: Option<PixWebhookBody>, query: PixWebhookQuery) -> Option<String> {
    let body = body.unwrap_or_default();
    value_to_id(body.data.and_then(|data| data.id))
        .or_else(|| value_to_id(body.id))
        .or(query.id.filter(|id| !id.is_empty()))
}

pub async fn handle_pix_notification<R, D, O, G, E>(
    State(webhook_usecase): State<Arc<WebhookUseCase<R, D, O, G, E>>>,
    Query(query): Query<PixWebhookQuery>,
    body: Option<Json<PixWebhookBody>>,
) -> impl IntoResponse
where
    R: PayableRepository + Send + Sync + 'static,
    D: PayableRepository + Send + Sync + 'static,
    O: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    let payment_id = extract_payment_id(body.map(|Json(body)| body), query);
    webhook_usecase.notify(payment_id).await;

    // The provider retries on anything but a 200.
    (StatusCode::OK, Json(json!({ "ok": true })))
}

pub async fn handle_pix_notification_query<R, D, O, G, E>(
    State(webhook_usecase): State<Arc<WebhookUseCase<R, D, O, G, E>>>,
    Query(query): Query<PixWebhookQuery>,
) -> impl IntoResponse
where
    R: PayableRepository + Send + Sync + 'static,
    D: PayableRepository + Send + Sync + 'static,
    O: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    webhook_usecase
        .notify(query.id.filter(|id| !id.is_empty()))
        .await;

    (StatusCode::OK, Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_data_id_wins_over_bare_id_and_query() {
        let body = PixWebhookBody {
            data: Some(PixWebhookData {
                id: Some(json!(123456)),
            }),
            id: Some(json!("ignored")),
        };
        let query = PixWebhookQuery {
            id: Some("also-ignored".to_string()),
        };

        assert_eq!(
            extract_payment_id(Some(body), query),
            Some("123456".to_string())
        );
    }

    #[test]
    fn falls_back_to_bare_id_then_query() {
        let body = PixWebhookBody {
            data: None,
            id: Some(json!("pay-1")),
        };
        assert_eq!(
            extract_payment_id(Some(body), PixWebhookQuery::default()),
            Some("pay-1".to_string())
        );

        let query = PixWebhookQuery {
            id: Some("pay-2".to_string()),
        };
        assert_eq!(extract_payment_id(None, query), Some("pay-2".to_string()));
    }

    #[test]
    fn missing_everything_yields_none() {
        assert_eq!(extract_payment_id(None, PixWebhookQuery::default()), None);
    }
}
