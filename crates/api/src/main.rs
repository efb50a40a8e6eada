use anyhow::Context;

use taskhub_infra::AppConfig;
use taskhub_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    taskhub_observability::init_with(LogFormat::from_name(&format));

    let config = AppConfig::from_env();
    let services = taskhub_api::app::AppServices::from_config(&config).await?;
    let app = taskhub_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
