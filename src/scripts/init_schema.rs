use anyhow::{Context, Result};
use ui_schema_api::config::AppConfig;
use ui_schema_api::seed;
use ui_schema_api::store::PostgresStore;

/// Create the UI definition and record tables, then optionally load the demo form.
///
/// Usage: ui-schema-init [--seed]
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let with_seed = std::env::args().skip(1).any(|arg| arg == "--seed");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = PostgresStore::connect(&config.database, &config.ui.schema).await?;
    log::info!("Connected to database. Creating tables in schema '{}'...", config.ui.schema);

    store.migrate().await?;
    log::info!("Tables ready");

    if with_seed {
        seed::load_seed_data(&store).await?;
        log::info!("Seed data loaded");
    }

    Ok(())
}
