use fraud_review_service::{ServiceConfig, create_app, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();
    init_tracing(config.log_format);

    let app = create_app(&config)?;
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Fraud Review Service starting on {}", addr);
    info!("Relaying backend calls to {}", config.backend_url);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Mock backend contract served under http://{}/v1", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
