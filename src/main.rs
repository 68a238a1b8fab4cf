use anyhow::Context;
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use ui_schema_api::api::handlers::AppState;
use ui_schema_api::api::routes::build_app;
use ui_schema_api::config::AppConfig;
use ui_schema_api::seed;
use ui_schema_api::store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .init();

    log::info!("UI schema API starting");

    let config = AppConfig::load().context("Failed to load configuration")?;
    log::info!(
        "Configuration loaded: server={}, schema={}, default product={}",
        config.server_address(),
        config.ui.schema,
        config.ui.default_product
    );

    // Nothing listens until the database has answered
    log::info!("Connecting to PostgreSQL...");
    let postgres_store = PostgresStore::connect(&config.database, &config.ui.schema).await?;
    log::info!("Database connection verified");

    if config.database.auto_migrate {
        log::info!("Creating missing tables in schema '{}'", config.ui.schema);
        postgres_store.migrate().await?;
    }

    let store = Arc::new(postgres_store);

    if config.database.load_seed_data {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
        log::info!("Seed data loaded successfully");
    }

    let state = Arc::new(AppState::new(store, &config));
    run_server(build_app(state, config.server.cors_permissive), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("UI schema API running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
