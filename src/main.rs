use anyhow::Result;
use frame_audit::{config::Config, http};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    frame_audit::load_env();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .with_ansi(false)
        .init();

    info!("Starting frame-audit analysis service");
    info!(
        "LLM provider: {} (model={}, temperature={})",
        config.llm.provider, config.llm.model, config.llm.temperature
    );
    info!(
        "Rate limit: {} requests per {} minute(s)",
        config.rate_limit.max_requests,
        config.rate_limit.window_ms / 60_000
    );
    info!(
        "Scenario length bounds: {}-{} characters",
        config.input.min_length, config.input.max_length
    );

    let ctx = http::AppContext::new(config)?;
    http::start_http_server(ctx).await?;

    Ok(())
}
