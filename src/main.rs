use anyhow::Result;
use retreat_backend::config::config_loader;
use retreat_backend::infrastructure::axum_http::http_serve;
use retreat_backend::infrastructure::postgres::{postgres_connection, schema_setup};
use retreat_backend::payments::pix_client::PixClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    schema_setup::ensure_schema(&postgres_pool)?;
    info!("Database schema is up to date");

    let pix_client = PixClient::new(
        dotenvy_env.payments.base_url.clone(),
        dotenvy_env.payments.access_token.clone(),
        dotenvy_env.payments.notification_url.clone(),
        dotenvy_env.payments.payer_email.clone(),
    );

    http_serve::start(
        Arc::new(dotenvy_env),
        Arc::new(postgres_pool),
        Arc::new(pix_client),
    )
    .await?;

    Ok(())
}
