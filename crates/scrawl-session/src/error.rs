//! Error types for the session layer.
//!
//! Game events themselves never fail: unauthorized or out-of-state events
//! are dropped or degraded to chat inside the coordinator. These errors
//! cover the plumbing around it.

use scrawl_protocol::{PlayerId, SessionId};

/// Errors from session setup and the actor/manager plumbing.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session does not exist.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The player already has a connection attached to a session.
    #[error("player {0} already attached to session {1}")]
    AlreadyAttached(PlayerId, SessionId),

    /// The player is not attached to any session.
    #[error("player {0} is not attached to any session")]
    NotAttached(PlayerId),

    /// The configured word list had no usable entries.
    #[error("word bank is empty")]
    EmptyWordBank,

    /// The session actor's command channel is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
