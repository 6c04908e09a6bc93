use outreach_dashboard::{load_records, router, AccountStore, AppState, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(
        "revenue rates: {}",
        config
            .rates
            .entries()
            .iter()
            .map(|(date, rate)| format!("{date}={rate}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let records = load_records(&config.records_path).await;
    let accounts = AccountStore::new(config.password_iterations);
    let state = AppState::new(config.records_path, records, config.rates, accounts);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
