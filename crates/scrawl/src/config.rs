//! Server configuration from the environment.
//!
//! | Variable              | Meaning                                   | Default        |
//! |-----------------------|-------------------------------------------|----------------|
//! | `PORT`                | listen on `0.0.0.0:$PORT`                 | `3000`         |
//! | `SCRAWL_BIND`         | full bind address, overrides `PORT`       |                |
//! | `SCRAWL_IDLE_TIMEOUT` | seconds without a frame before hang-up    | `300`          |
//! | `SCRAWL_CONFIG`       | path to a JSON [`GameConfig`] file        | built-in       |

use std::time::Duration;

use scrawl_session::GameConfig;

use crate::ScrawlError;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub idle_timeout: Duration,
    pub game: GameConfig,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ScrawlError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScrawlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ScrawlError::Config(format!("PORT is not a valid port: {port}")))?;
            config.bind = format!("0.0.0.0:{port}");
        }
        if let Some(bind) = lookup("SCRAWL_BIND") {
            config.bind = bind;
        }
        if let Some(secs) = lookup("SCRAWL_IDLE_TIMEOUT") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ScrawlError::Config(format!("SCRAWL_IDLE_TIMEOUT is not a number: {secs}"))
            })?;
            config.idle_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(path) = lookup("SCRAWL_CONFIG") {
            let raw = std::fs::read_to_string(&path)?;
            config.game = parse_game_config(&raw)
                .map_err(|e| ScrawlError::Config(format!("{path}: {e}")))?;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: format!("0.0.0.0:{}", Self::DEFAULT_PORT),
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            game: GameConfig::default(),
        }
    }
}

fn parse_game_config(raw: &str) -> Result<GameConfig, serde_json::Error> {
    serde_json::from_str::<GameConfig>(raw).map(GameConfig::validated)
}
