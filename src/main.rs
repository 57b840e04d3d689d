/**
 * WaveChat Server Entry Point
 *
 * Binds the HTTP server and serves the chat, notification, and room
 * APIs. Configuration comes from the environment (and a `.env` file
 * when present).
 */
use wavechat::server::{create_app, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = ServerConfig::from_env();
    let port = config.port;
    let app = create_app(config).await;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("[Startup] Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
