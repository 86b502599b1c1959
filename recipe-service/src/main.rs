use anyhow::Context;
use recipe_service::{LogFormat, ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recipe_service=debug,recipe_flow=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }

    let app = create_app(&config);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    info!(
        model = %config.model,
        images_enabled = config.images.is_some(),
        strict_requests = config.strict_requests,
        "Recipe service starting on {}",
        addr
    );
    info!("Health check endpoint: http://{}/health", addr);
    info!("Recipe endpoint: POST http://{}/api/generate-recipe", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
