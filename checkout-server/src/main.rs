use checkout_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (.env is optional, real deployments set vars directly)
    dotenv::dotenv().ok();

    // 2. Configuration - fail fast before anything binds
    let config = Config::from_env()?;

    // 3. Logging
    init_logger_with_file(None, config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        "Checkout server starting..."
    );

    // 4. State and HTTP server (run starts the background sweeps)
    let state = ServerState::initialize(&config)?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
