use anyhow::Context;

use beadstock_infra::InfraConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    beadstock_observability::init();

    let config = InfraConfig::from_env().context("invalid configuration")?;
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL not set; using in-memory store");
    }

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let app = beadstock_api::app::build_app(config)
        .await
        .context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
