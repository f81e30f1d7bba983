//! Arbilo - a terminal client for the Arbilo arbitrage signal service.
//!
//! Signs users and admins in, polls the arbitrage dashboard and renders it
//! as sortable, paginated tables.

use anyhow::Context;
use arbilo::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file: the terminal belongs to the UI
    let log_dir = arbilo::config::log_dir().context("Failed to resolve log directory")?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "arbilo.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbilo=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    // Load configuration
    let config = Config::load_or_default().context("Failed to load configuration")?;
    tracing::info!(environment = ?config.api.environment, "Starting Arbilo");

    // Run the application
    let mut app = App::new(config)
        .await
        .context("Failed to start the application")?;
    app.run().await.context("Application error")?;

    Ok(())
}
