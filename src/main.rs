use tracing::{error, info};

mod chat;
mod config;
mod error;
mod interface;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let dotenv = dotenvy::dotenv();

    // Initialize logging with default filter if RUST_LOG is not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = dotenv {
        // It's not fatal if .env doesn't exist
        info!("No .env file found or failed to load: {}", e);
    }

    info!("Chatboard starting...");

    let config = config::Config::from_env()?;

    info!("Initializing store at {}", config.db_path.display());
    let store = store::Store::new(&config.db_path).await?;
    store.init().await?;

    let server =
        interface::web::ChatServer::new(store, config.credentials, config.display_offset);
    let app = server.router();

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        res = axum::serve(listener, app) => {
            if let Err(e) = res {
                error!("Server stopped with error: {}", e);
            }
        }
    }

    Ok(())
}
