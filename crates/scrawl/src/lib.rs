//! # Scrawl
//!
//! Real-time multiplayer drawing and guessing server.
//!
//! One player draws a secret word while everyone else races to guess it in
//! chat; faster guesses score more. Clients speak JSON events over a
//! WebSocket, and every session runs as its own actor task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrawl::prelude::*;
//!
//! # async fn start() -> Result<(), ScrawlError> {
//! let server = ScrawlServerBuilder::from_config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::ScrawlError;
pub use server::{ScrawlServer, ScrawlServerBuilder};

pub mod prelude {
    pub use crate::{ScrawlError, ScrawlServer, ScrawlServerBuilder, ServerConfig};
    pub use scrawl_protocol::{
        Avatar, ClientEvent, GameStateView, MessageKind, Player, PlayerId, ServerEvent,
        SessionId, SessionStatus,
    };
    pub use scrawl_session::{GameConfig, SelectionPolicy, SessionHandle, SessionSnapshot};
}
