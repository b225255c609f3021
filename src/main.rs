mod ai;
mod app;
mod auth;
mod config;
mod db;
mod dto;
mod error;
#[cfg(test)]
mod memory;
mod profile;
mod projects;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "plume=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr()?;

    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let state = AppState::with_postgres(config, pool.clone())?;
    tracing::info!(remote_ai = state.ai.has_remote(), "application state ready");

    app::serve(app::build_app(state), addr).await?;

    pool.close().await;
    tracing::info!("shut down cleanly");
    Ok(())
}
