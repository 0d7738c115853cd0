use lawfirm_portal::{
    AppState,
    api::ApiState,
    config::{AppConfig, Env},
    create_router,
    storage::{FileStore, StoreState},
    HttpApiClient,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, the API client, the durable client
/// store, then the HTTP server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging filter, RUST_LOG first
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lawfirm_portal=debug,tower_http=info".into());

    // 3. Log format per environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Collaborating REST API
    let api = Arc::new(HttpApiClient::new(&config.api_base_url, config.enquiry_limit)) as ApiState;
    tracing::info!(base_url = %config.api_base_url, "API client ready");

    // 5. Durable client store (session, disclaimer flag)
    let file_store = FileStore::open(config.storage_path.clone())?;
    tracing::info!(path = %file_store.path().display(), "client store opened");
    let store = Arc::new(file_store) as StoreState;

    // 6. State, router, server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(api, store, config));

    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
