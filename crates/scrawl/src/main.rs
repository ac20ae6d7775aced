use scrawl::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind,
        idle_timeout_secs = config.idle_timeout.as_secs(),
        round_secs = config.game.round_secs,
        words = config.game.words.len(),
        "starting scrawl server"
    );

    let server = ScrawlServerBuilder::from_config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, lobby = %server.lobby(), "listening");
    server.run().await?;
    Ok(())
}
