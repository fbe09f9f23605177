use std::net::SocketAddr;
use std::sync::Arc;

use sojourn_api::{
    app,
    state::{AppState, AuthConfig, CheckoutConfig},
};
use sojourn_core::gateway::PaymentGateway;
use sojourn_store::{ChapaGateway, DbClient, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sojourn_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = sojourn_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Sojourn API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let store = Arc::new(PgStore::new(db.pool.clone()));

    let gateway: Option<Arc<dyn PaymentGateway>> = match config.gateway.secret_key.clone() {
        Some(secret_key) => Some(Arc::new(ChapaGateway::new(
            reqwest::Client::new(),
            &config.gateway.api_base,
            secret_key,
        ))),
        None => {
            tracing::warn!(
                "No gateway secret key configured; payment endpoints will refuse requests"
            );
            None
        }
    };

    let app_state = AppState {
        hotel_repo: store.clone(),
        booking_repo: store.clone(),
        payment_repo: store,
        gateway,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        checkout: CheckoutConfig {
            currency: config.gateway.currency.clone(),
            callback_url: config.gateway.callback_url.clone(),
            return_url: config.gateway.return_url.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
