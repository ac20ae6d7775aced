//! Session manager: creates, tracks, and routes players to sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use scrawl_protocol::{ClientEvent, PlayerId, SessionId};

use crate::actor::spawn_session;
use crate::select::Selector;
use crate::{
    GameConfig, PlayerSender, SessionCoordinator, SessionError, SessionHandle, SessionInfo,
    SessionSnapshot,
};

/// Counter for generating unique session IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Tracks every running session and which session each player is attached to.
///
/// A player is attached to at most one session at a time.
pub struct SessionManager {
    sessions: HashMap<SessionId, SessionHandle>,
    player_sessions: HashMap<PlayerId, SessionId>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            player_sessions: HashMap::new(),
        }
    }

    /// Spawn a session using the selection policy from `config`.
    pub fn create_session(&mut self, config: GameConfig) -> Result<SessionId, SessionError> {
        let selector = config.selection.build();
        self.create_session_with(config, selector)
    }

    /// Spawn a session with a custom selection strategy.
    pub fn create_session_with(
        &mut self,
        config: GameConfig,
        selector: Box<dyn Selector>,
    ) -> Result<SessionId, SessionError> {
        let session_id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let coordinator = SessionCoordinator::with_selector(session_id, config, selector)?;
        let clock_config = coordinator.config().clock_config();
        let handle = spawn_session(coordinator, clock_config, DEFAULT_CHANNEL_SIZE);
        self.sessions.insert(session_id, handle);
        tracing::info!(%session_id, "session created");
        Ok(session_id)
    }

    /// Attach a player's connection to a session.
    pub async fn attach(
        &mut self,
        player_id: PlayerId,
        session_id: SessionId,
        sender: PlayerSender,
    ) -> Result<(), SessionError> {
        if let Some(current) = self.player_sessions.get(&player_id) {
            return Err(SessionError::AlreadyAttached(player_id, *current));
        }
        let handle = self
            .sessions
            .get(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;

        handle.attach(player_id, sender).await?;
        self.player_sessions.insert(player_id, session_id);
        Ok(())
    }

    /// Detach a player from whatever session they are in.
    pub async fn detach(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        let session_id = self
            .player_sessions
            .remove(&player_id)
            .ok_or(SessionError::NotAttached(player_id))?;

        match self.sessions.get(&session_id) {
            Some(handle) => handle.detach(player_id).await,
            None => Ok(()),
        }
    }

    /// Route a client event to the player's session.
    pub async fn route(&self, player_id: PlayerId, event: ClientEvent) -> Result<(), SessionError> {
        let session_id = self
            .player_sessions
            .get(&player_id)
            .ok_or(SessionError::NotAttached(player_id))?;
        let handle = self
            .sessions
            .get(session_id)
            .ok_or(SessionError::NotFound(*session_id))?;
        handle.dispatch(player_id, event).await
    }

    pub async fn session_info(&self, session_id: SessionId) -> Result<SessionInfo, SessionError> {
        self.get(session_id)?.info().await
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<SessionSnapshot, SessionError> {
        self.get(session_id)?.snapshot().await
    }

    /// Info for every session that still responds.
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let mut infos = Vec::with_capacity(self.sessions.len());
        for handle in self.sessions.values() {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos.sort_by_key(|info| info.session_id.0);
        infos
    }

    /// A cloned handle, for callers that talk to the actor directly.
    pub fn handle(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.get(&session_id).cloned()
    }

    /// Shut a session down and forget its players.
    pub async fn destroy_session(&mut self, session_id: SessionId) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;

        let _ = handle.shutdown().await;
        self.player_sessions.retain(|_, sid| *sid != session_id);

        tracing::info!(%session_id, "session destroyed");
        Ok(())
    }

    pub fn player_session(&self, player_id: PlayerId) -> Option<SessionId> {
        self.player_sessions.get(&player_id).copied()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn get(&self, session_id: SessionId) -> Result<&SessionHandle, SessionError> {
        self.sessions
            .get(&session_id)
            .ok_or(SessionError::NotFound(session_id))
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
