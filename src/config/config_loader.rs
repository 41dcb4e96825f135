use anyhow::{Ok, Result};

use super::config_model::{
    Database, DotEnvyConfig, PixGatewaySettings, Pricing, Server, SessionSecrets,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let payments = PixGatewaySettings {
        base_url: std::env::var("PIX_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.mercadopago.com".to_string()),
        access_token: std::env::var("PIX_ACCESS_TOKEN").expect("PIX_ACCESS_TOKEN is invalid"),
        notification_url: std::env::var("PIX_NOTIFICATION_URL").ok(),
        payer_email: std::env::var("PIX_PAYER_EMAIL")
            .unwrap_or_else(|_| "registration@retreat.local".to_string()),
    };

    let pricing = Pricing {
        registration_amount_minor: std::env::var("REGISTRATION_AMOUNT_MINOR")
            .unwrap_or_else(|_| "10100".to_string())
            .parse()?,
        fee_rate: std::env::var("PAYMENT_FEE_RATE")
            .unwrap_or_else(|_| "0.0099".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        payments,
        pricing,
    })
}

pub fn get_session_secrets() -> Result<SessionSecrets> {
    dotenvy::dotenv().ok();

    Ok(SessionSecrets {
        user_secret: std::env::var("SESSION_USER_SECRET").expect("SESSION_USER_SECRET is invalid"),
        admin_secret: std::env::var("SESSION_ADMIN_SECRET")
            .expect("SESSION_ADMIN_SECRET is invalid"),
    })
}
