use anyhow::{Context, Result};
use attendance_agent::config::Config;
use attendance_agent::logging::init_subscriber;
use attendance_agent::providers::OpenAIProvider;
use attendance_agent::routes;
use attendance_agent::state::AppState;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_subscriber();

    let config = Config::from_env()?;
    tracing::info!(model = %config.model, "Starting attendance assistant backend");

    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to MySQL")?;

    let provider = match &config.openai_base_url {
        Some(base_url) => OpenAIProvider::with_base_url(
            config.openai_api_key.clone(),
            config.model.clone(),
            base_url.clone(),
        ),
        None => OpenAIProvider::new(config.openai_api_key.clone(), config.model.clone()),
    };

    let addr = config.bind_addr();
    let state = AppState {
        provider: Arc::new(provider),
        pool,
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
