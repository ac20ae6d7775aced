//! Unified error type for the Scrawl server.

use scrawl_protocol::ProtocolError;
use scrawl_session::SessionError;
use scrawl_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScrawlError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (not found, unavailable, bad word list).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid server configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a config file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use scrawl_protocol::SessionId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let scrawl_err: ScrawlError = TransportError::SendFailed(io).into();
        assert!(matches!(scrawl_err, ScrawlError::Transport(_)));
        assert!(scrawl_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let scrawl_err: ScrawlError = ProtocolError::Decode(err).into();
        assert!(matches!(scrawl_err, ScrawlError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotFound(SessionId(1));
        let scrawl_err: ScrawlError = err.into();
        assert!(matches!(scrawl_err, ScrawlError::Session(_)));
        assert_eq!(scrawl_err.to_string(), "session S-1 not found");
    }

    #[test]
    fn test_config_error_message() {
        let err = ScrawlError::Config("PORT is not a number".into());
        assert_eq!(err.to_string(), "configuration error: PORT is not a number");
    }
}
