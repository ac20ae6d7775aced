//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler:
//!   1. Bind the connection id as the player's identity and attach an
//!      outbound channel to the lobby session
//!   2. Spawn a writer task that encodes and sends every queued event and
//!      pings the peer whenever the line has been quiet for a while
//!   3. Loop: receive frames → decode `ClientEvent` → dispatch to the session
//!
//! Any inbound frame, pongs included, counts as activity for the idle
//! timeout, so a silent spectator whose client answers pings stays joined.
//!
//! When the loop ends for any reason the guard detaches the player, which
//! the session treats as a disconnect.

use std::sync::Arc;

use scrawl_protocol::{ClientEvent, Codec, PlayerId, ServerEvent};
use scrawl_session::SessionError;
use scrawl_transport::{Connection, Frame, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ScrawlError;
use crate::server::ServerState;

/// Drop guard that detaches a player when the handler exits.
///
/// `Drop` is synchronous, so the detach runs in a spawned task.
struct DetachGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DetachGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut sessions = state.sessions.lock().await;
            if let Err(e) = sessions.detach(player_id).await {
                tracing::debug!(%player_id, error = %e, "detach failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScrawlError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    let (tx, rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Cache the session handle so inbound events skip the manager lock.
    let session = {
        let mut sessions = state.sessions.lock().await;
        sessions.attach(player_id, state.lobby, tx).await?;
        sessions
            .handle(state.lobby)
            .ok_or(SessionError::NotFound(state.lobby))?
    };
    let _guard = DetachGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%player_id, peer = %conn.peer_addr(), "connection attached");

    let writer = tokio::spawn(write_events(Arc::clone(&conn), Arc::clone(&state), rx, player_id));

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(Frame::Data(data)))) => data,
            Ok(Ok(Some(Frame::Heartbeat))) => continue,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle, dropping");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "undecodable frame ignored");
                continue;
            }
        };

        if let Err(e) = session.dispatch(player_id, event).await {
            tracing::warn!(%player_id, error = %e, "session gone, closing connection");
            break;
        }
    }

    writer.abort();
    let _ = conn.close().await;
    Ok(())
}

/// Drains the player's outbound channel onto the socket, pinging the peer
/// every `ping_interval`. Ends when the session drops the sender or the
/// socket fails.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    player_id: PlayerId,
) {
    let mut keepalive = tokio::time::interval(state.ping_interval);
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    keepalive.reset();

    loop {
        let event = tokio::select! {
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = keepalive.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%player_id, error = %e, "ping failed, stopping writer");
                    break;
                }
                continue;
            }
        };
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%player_id, event = event.name(), error = %e, "encode failed");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%player_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
