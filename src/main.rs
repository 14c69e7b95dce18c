use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::EnvFilter;

use alerthook::{AppState, config, routes};

fn setup_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .compact()
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env may carry RUST_LOG, so load it before the subscriber is built
    dotenvy::dotenv().ok();
    setup_logger();

    let settings = config::load();

    let host: IpAddr = settings.host.parse()?;
    let addr = SocketAddr::from((host, settings.port));

    tracing::info!(
        script = %settings.trade_script.display(),
        interpreter = settings.trade_interpreter.as_deref().unwrap_or("-"),
        timeout_secs = settings.trade_timeout.as_secs(),
        secret_configured = settings.webhook_secret.is_some(),
        "trade dispatcher configured"
    );

    let app = routes::app(AppState::new(settings));

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
