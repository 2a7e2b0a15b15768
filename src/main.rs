use bifrost_sync::server::{config::Config, error::Error, startup};
use dioxus_logger::tracing::{self, Level};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dioxus_logger::init(Level::INFO) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run(config).await {
        tracing::error!("Bifrost sync stopped with an error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let mut app = startup::build_app(&config).await?;

    tracing::info!(
        "Starting Bifrost sync for {:?}",
        app.registry
            .enabled()
            .iter()
            .map(|service| service.as_str())
            .collect::<Vec<_>>()
    );

    app.worker.pool.start().await?;
    app.scheduler.start(&config.resync_cron).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutdown signal received");

    app.scheduler.shutdown().await?;
    app.worker.pool.stop().await?;

    Ok(())
}
