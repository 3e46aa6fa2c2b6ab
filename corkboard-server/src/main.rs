use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use corkboard_server::api::create_router;
use corkboard_server::cli::CliArgs;
use corkboard_server::config::ServerConfig;
use corkboard_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli_args = CliArgs::parse();

    // Set up logging
    let filter = if let Some(ref level) = cli_args.log_level {
        tracing_subscriber::EnvFilter::new(level)
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Corkboard server v{}", corkboard::VERSION);

    // Load configuration from CLI arguments and environment variables
    let server_config = ServerConfig::from_cli_and_env(cli_args.clone())?;
    info!("Server configuration loaded");

    // Load the engine configuration, from file if provided
    let engine_config = if let Some(config_file) = &cli_args.config_file {
        info!("Loading engine configuration from: {}", config_file.display());

        let mut loader = corkboard::config::ConfigLoader::new();
        match loader.load_file(config_file) {
            Ok(loader) => match loader.load_env().build() {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_file.display(),
                        e
                    );
                    corkboard::config::ConfigBuilder::defaults().build()?
                }
            },
            Err(e) => {
                warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    config_file.display(),
                    e
                );
                corkboard::config::ConfigBuilder::defaults().build()?
            }
        }
    } else {
        let mut loader = corkboard::config::ConfigLoader::new();
        loader.load_default_files().load_env().build()?
    };

    let engine = corkboard::init(engine_config)?;
    info!("Corkboard engine initialized");

    // Create application state and router
    let app_state = Arc::new(AppState::new(engine, server_config.clone()));
    let app = create_router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("API documentation available at http://{}/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
