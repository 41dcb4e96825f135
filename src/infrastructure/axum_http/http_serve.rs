use crate::config::config_model::DotEnvyConfig;
use crate::infrastructure::axum_http::{default_routers, routers};
use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;
use crate::payments::pix_client::PixClient;
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    pix_client: Arc<PixClient>,
) -> Result<()> {
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/registrations",
            routers::registrations::routes(
                Arc::clone(&db_pool),
                Arc::clone(&pix_client),
                Arc::clone(&config),
            ),
        )
        .nest(
            "/api/v1/auth",
            routers::accounts::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/cart",
            routers::cart::routes(Arc::clone(&db_pool), Arc::clone(&pix_client)),
        )
        .nest(
            "/api/v1/orders",
            routers::orders::routes(Arc::clone(&db_pool), Arc::clone(&pix_client)),
        )
        .nest(
            "/api/v1/donations",
            routers::donations::routes(Arc::clone(&db_pool), Arc::clone(&pix_client)),
        )
        .nest(
            "/api/v1/admin",
            routers::admin::routes(
                Arc::clone(&db_pool),
                Arc::clone(&pix_client),
                Arc::clone(&config),
            ),
        )
        .nest(
            "/api/v1/webhooks",
            routers::webhook::routes(
                Arc::clone(&db_pool),
                Arc::clone(&pix_client),
                Arc::clone(&config),
            ),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .route(
            "/api/v1/health-check/db",
            get(default_routers::db_ping).with_state(Arc::clone(&db_pool)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
