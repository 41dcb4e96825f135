use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::domain::value_objects::cpf::Cpf;
use crate::domain::value_objects::money;
use crate::domain::value_objects::payments::{ChargeRequest, NewCharge};

/// Minimal PIX payment client built on reqwest (Mercado Pago shaped API).
pub struct PixClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    notification_url: Option<String>,
    default_payer_email: String,
}

/// A created charge: the gateway id plus the PIX artifacts for the payer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixPaymentData {
    pub payment_id: String,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
}

/// A polled charge: current status and, when present, when the code dies.
#[derive(Debug, Clone, PartialEq)]
pub struct PixPaymentProbe {
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<PixPaymentData> for NewCharge {
    fn from(value: PixPaymentData) -> Self {
        NewCharge {
            payment_id: value.payment_id,
            qr_code: value.qr_code,
            qr_base64: value.qr_base64,
            ticket_url: value.ticket_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody {
    transaction_amount: f64,
    description: String,
    payment_method_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_url: Option<String>,
    payer: PaymentPayer,
}

#[derive(Debug, Serialize)]
struct PaymentPayer {
    email: String,
    first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identification: Option<PayerIdentification>,
}

#[derive(Debug, Serialize)]
struct PayerIdentification {
    #[serde(rename = "type")]
    type_: &'static str,
    number: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: Option<i64>,
    status: Option<String>,
    date_of_expiration: Option<String>,
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
    ticket_url: Option<String>,
    external_resource_url: Option<String>,
    date_of_expiration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
    status: Option<i64>,
}

impl PixClient {
    pub fn new(
        base_url: String,
        access_token: String,
        notification_url: Option<String>,
        default_payer_email: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token,
            notification_url,
            default_payer_email,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (gateway_message, gateway_error, gateway_status) =
            match serde_json::from_str::<GatewayErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.message, envelope.error, envelope.status),
                Err(_) => (None, None, None),
            };

        error!(
            status = %status,
            gateway_request_id = ?request_id,
            gateway_message = ?gateway_message,
            gateway_error = ?gateway_error,
            gateway_status = ?gateway_status,
            response_body = %body,
            context = %context,
            "pix gateway request failed"
        );

        anyhow::bail!(
            "PIX gateway request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Creates a PIX charge and returns its id and scannable artifacts.
    pub async fn create_payment(&self, request: &ChargeRequest) -> Result<PixPaymentData> {
        if request.amount_minor <= 0 {
            anyhow::bail!("Invalid transaction amount: {}", request.amount_minor);
        }

        // Only a CPF that survives check-digit validation is forwarded as
        // payer identification; anything else is sent without one.
        let identification = request
            .payer_cpf
            .as_deref()
            .and_then(|cpf| Cpf::parse(cpf).ok())
            .map(|cpf| PayerIdentification {
                type_: "CPF",
                number: cpf.into_string(),
            });

        let body = CreatePaymentBody {
            transaction_amount: money::minor_to_decimal(request.amount_minor),
            description: request.description.clone(),
            payment_method_id: "pix",
            notification_url: self.notification_url.clone(),
            payer: PaymentPayer {
                email: self.default_payer_email.clone(),
                first_name: request.payer_name.clone(),
                identification,
            },
        };

        let resp = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json")
            .header("X-Idempotency-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create payment").await?;

        let parsed: PaymentResponse = resp.json().await?;
        let payment_id = parsed
            .id
            .map(|id| id.to_string())
            .ok_or_else(|| anyhow::anyhow!("PIX payment id is missing"))?;

        let transaction_data = parsed
            .point_of_interaction
            .and_then(|poi| poi.transaction_data);

        let (qr_code, qr_base64, ticket_url) = match transaction_data {
            Some(data) => (
                data.qr_code,
                data.qr_code_base64,
                data.ticket_url.or(data.external_resource_url),
            ),
            None => (None, None, None),
        };

        Ok(PixPaymentData {
            payment_id,
            qr_code,
            qr_base64,
            ticket_url,
        })
    }

    /// Fetches the current status of a charge.
    pub async fn get_payment(&self, payment_id: &str) -> Result<PixPaymentProbe> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get payment").await?;

        let parsed: PaymentResponse = resp.json().await?;

        let expiration_raw = parsed.date_of_expiration.or_else(|| {
            parsed
                .point_of_interaction
                .and_then(|poi| poi.transaction_data)
                .and_then(|data| data.date_of_expiration)
        });

        // Unparseable expiration strings are treated as absent.
        let expires_at = expiration_raw
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc));

        Ok(PixPaymentProbe {
            status: parsed.status.unwrap_or_default(),
            expires_at,
        })
    }
}
