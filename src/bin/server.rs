//! IBKR Dashboard Web Server
//!
//! REST API for the dashboard frontend: auth, bot control, account data.

use anyhow::Result;
use ibkr_dashboard::api::{create_app, AppState};
use ibkr_dashboard::Config;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Override with RUST_LOG, e.g. RUST_LOG=debug or RUST_LOG=info,bot=warn
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let port = config.port;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║       IBKR DASHBOARD - BOT MANAGER API                       ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Bot command: {:<46} ║", launch_summary(&config));
    println!("║  Bot commands via: {:<41} ║", if config.bot_api_url.is_some() { "HTTP" } else { "FILE" });
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    info!("Initializing application state...");
    let state = AppState::new(config);
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", port);
    println!("  Bot control API ready at http://localhost:{}/api", port);
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn launch_summary(config: &Config) -> String {
    let (path, cmd) = config.resolve_launch(None, None);
    format!("{} {}", cmd, path)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
