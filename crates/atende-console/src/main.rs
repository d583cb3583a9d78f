use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atende::prelude::InboxBuilder;
use atende::store::{JsonFileStore, KeyValueStore};
use atende_console::{cli::Cli, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    let store = match &config.store.path {
        Some(path) => JsonFileStore::open(path)?,
        None => JsonFileStore::open_default()?,
    };
    tracing::debug!(path = %store.path().display(), "Using local store");
    let store: Arc<dyn KeyValueStore> = Arc::new(store);

    let mut builder = InboxBuilder::new()
        .base_url(&config.api.base_url)
        .timeout(config.timeout())
        .sync_config(config.sync_config())
        .store(store);
    if let Some(token) = &config.token {
        builder = builder.token(token);
    }
    let inbox = builder.build()?;

    cli.command.execute(&inbox).await
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so command output stays clean
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
