//! Session actor: an isolated Tokio task that owns one coordinator.
//!
//! Inbound events and round clock firings are serialized through a single
//! `tokio::select!` loop, so the coordinator never needs a lock. Outbound
//! events go to each connection's unbounded channel and never block the
//! loop.

use std::collections::HashMap;

use scrawl_protocol::{ClientEvent, PlayerId, Recipient, ServerEvent, SessionId, SessionStatus};
use scrawl_tick::{ClockConfig, RoundClock};
use tokio::sync::{mpsc, oneshot};

use crate::outbox::{Outbox, TimerCommand};
use crate::{SessionCoordinator, SessionError, SessionSnapshot};

/// Channel sender for delivering events to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    /// Register a connection's outbound channel.
    Attach {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Drop a connection and remove its player from the game.
    Detach {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// An inbound client event.
    Event {
        sender: PlayerId,
        event: ClientEvent,
    },

    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    Info {
        reply: oneshot::Sender<SessionInfo>,
    },

    Shutdown,
}

/// Session metadata (no game secrets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub status: SessionStatus,
    /// Players who have joined the game.
    pub player_count: usize,
    /// Attached connections, joined or not.
    pub connection_count: usize,
    pub max_players: usize,
}

/// Handle to a running session actor.
///
/// Cheap to clone; connection handlers keep their own copy so routing an
/// event never goes through the manager.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Register `sender` as the outbound channel for `player_id`.
    pub async fn attach(&self, player_id: PlayerId, sender: PlayerSender) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Attach {
            player_id,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Detach a connection; the player leaves the game.
    pub async fn detach(&self, player_id: PlayerId) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Detach {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Deliver a client event (fire-and-forget).
    pub async fn dispatch(&self, sender: PlayerId, event: ClientEvent) -> Result<(), SessionError> {
        self.send(SessionCommand::Event { sender, event }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Stop the actor. Pending timers die with it.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> SessionError {
        SessionError::Unavailable(self.session_id)
    }
}

struct SessionActor {
    session_id: SessionId,
    coordinator: SessionCoordinator,
    clock: RoundClock,
    connections: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "session actor started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle_command(command) {
                        break;
                    }
                }
                fired = self.clock.wait() => {
                    let out = self.coordinator.on_timer(fired);
                    self.deliver(out);
                }
            }
        }

        self.clock.cancel();
        tracing::info!(session_id = %self.session_id, "session actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Attach {
                player_id,
                sender,
                reply,
            } => {
                let _ = reply.send(self.attach(player_id, sender));
            }
            SessionCommand::Detach { player_id, reply } => {
                let _ = reply.send(self.detach(player_id));
            }
            SessionCommand::Event { sender, event } => {
                if !self.connections.contains_key(&sender) {
                    tracing::warn!(
                        session_id = %self.session_id,
                        %sender,
                        "event from unattached connection, ignoring"
                    );
                    return true;
                }
                let out = self.coordinator.handle(sender, event);
                self.deliver(out);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.coordinator.snapshot());
            }
            SessionCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            SessionCommand::Shutdown => {
                tracing::info!(session_id = %self.session_id, "session shutting down");
                return false;
            }
        }
        true
    }

    fn attach(&mut self, player_id: PlayerId, sender: PlayerSender) -> Result<(), SessionError> {
        if self.connections.contains_key(&player_id) {
            return Err(SessionError::AlreadyAttached(player_id, self.session_id));
        }
        self.connections.insert(player_id, sender);
        tracing::debug!(session_id = %self.session_id, %player_id, "connection attached");
        Ok(())
    }

    fn detach(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        if self.connections.remove(&player_id).is_none() {
            return Err(SessionError::NotAttached(player_id));
        }
        tracing::debug!(session_id = %self.session_id, %player_id, "connection detached");
        let out = self.coordinator.disconnect(player_id);
        self.deliver(out);
        Ok(())
    }

    /// Apply the timer command, then route each event to its recipients.
    fn deliver(&mut self, out: Outbox) {
        let (events, timer) = out.into_parts();

        match timer {
            Some(TimerCommand::StartTicking { epoch }) => self.clock.start_ticking(epoch),
            Some(TimerCommand::StartDelay { epoch, after }) => self.clock.start_delay(epoch, after),
            Some(TimerCommand::Cancel) => self.clock.cancel(),
            None => {}
        }

        let roster = self.coordinator.roster();
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for (id, tx) in &self.connections {
                        if roster.contains(*id) {
                            let _ = tx.send(event.clone());
                        }
                    }
                }
                Recipient::Player(id) => {
                    if let Some(tx) = self.connections.get(&id) {
                        let _ = tx.send(event);
                    }
                }
                Recipient::AllExcept(excluded) => {
                    for (id, tx) in &self.connections {
                        if *id != excluded && roster.contains(*id) {
                            let _ = tx.send(event.clone());
                        }
                    }
                }
            }
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id,
            status: self.coordinator.engine().status(),
            player_count: self.coordinator.roster().len(),
            connection_count: self.connections.len(),
            max_players: self.coordinator.config().max_players,
        }
    }
}

/// Spawn a session actor task and return a handle to it.
pub(crate) fn spawn_session(
    coordinator: SessionCoordinator,
    clock_config: ClockConfig,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let session_id = coordinator.session_id();

    let actor = SessionActor {
        session_id,
        coordinator,
        clock: RoundClock::new(clock_config),
        connections: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}
