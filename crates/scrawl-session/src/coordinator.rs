//! Session coordinator: authorization and dispatch of client events.
//!
//! One coordinator per session. It owns the roster and the round engine
//! outright; the hosting actor feeds it one event or timer firing at a time
//! and delivers the resulting [`Outbox`]. Nothing here fails: events that
//! are not allowed in the current state are dropped with a debug log.

use std::sync::Arc;

use scrawl_protocol::{
    Avatar, ClientEvent, MessageKind, Player, PlayerId, Recipient, ServerEvent, SessionId,
    SessionStatus,
};
use scrawl_tick::Fired;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{RoundEngine, Verdict};
use crate::outbox::Outbox;
use crate::select::Selector;
use crate::{GameConfig, Roster, SessionError, WordBank};

/// Name given to players who join without one.
pub const DEFAULT_PLAYER_NAME: &str = "Ghost_User";

/// Full session state, word included. For operators and tests; never sent
/// to players.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub current_word: Option<String>,
    pub drawer_id: Option<PlayerId>,
    pub timer: u32,
    pub winners: Vec<PlayerId>,
    pub round: u64,
    pub players: Vec<Player>,
}

pub struct SessionCoordinator {
    session_id: SessionId,
    config: Arc<GameConfig>,
    roster: Roster,
    engine: RoundEngine,
}

impl SessionCoordinator {
    /// Build a coordinator using the selection policy named in `config`.
    pub fn new(session_id: SessionId, config: GameConfig) -> Result<Self, SessionError> {
        let selector = config.selection.build();
        Self::with_selector(session_id, config, selector)
    }

    /// Build a coordinator with a custom selection strategy.
    ///
    /// # Errors
    /// [`SessionError::EmptyWordBank`] if `config.words` has no usable word.
    pub fn with_selector(
        session_id: SessionId,
        config: GameConfig,
        selector: Box<dyn Selector>,
    ) -> Result<Self, SessionError> {
        let config = Arc::new(config.validated());
        let words = WordBank::new(&config.words)?;
        let engine = RoundEngine::new(session_id, Arc::clone(&config), words, selector);
        Ok(Self {
            session_id,
            config,
            roster: Roster::new(),
            engine,
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    /// Dispatch one inbound event from `sender`.
    pub fn handle(&mut self, sender: PlayerId, event: ClientEvent) -> Outbox {
        match event {
            ClientEvent::JoinGame { name, avatar } => self.join(sender, &name, avatar),
            ClientEvent::DrawStroke(stroke) => self.draw_stroke(sender, stroke),
            ClientEvent::ClearCanvas {} => self.clear_canvas(sender),
            ClientEvent::SendMessage { text } => self.send_message(sender, &text),
        }
    }

    pub fn join(&mut self, sender: PlayerId, name: &str, avatar: Avatar) -> Outbox {
        let mut out = Outbox::new();

        if self.roster.contains(sender) {
            debug!(session_id = %self.session_id, player_id = %sender, "duplicate join ignored");
            return out;
        }
        if self.roster.len() >= self.config.max_players {
            info!(session_id = %self.session_id, player_id = %sender, "join refused, session full");
            out.system_to(sender, "This game is full, try again later");
            return out;
        }

        let name = clean_name(name, self.config.max_name_len);
        self.roster.add(sender, name.clone(), avatar);
        info!(
            session_id = %self.session_id,
            player_id = %sender,
            %name,
            players = self.roster.len(),
            "player joined"
        );

        out.to_all(ServerEvent::PlayerListUpdate(self.roster.snapshot()));
        out.to_player(sender, ServerEvent::GameStateUpdate(self.engine.view_for(sender)));
        out.system(format!("{name} joined the game"));
        self.engine.maybe_start(&self.roster, &mut out);
        out
    }

    pub fn draw_stroke(&mut self, sender: PlayerId, stroke: serde_json::Value) -> Outbox {
        let mut out = Outbox::new();
        if !self.engine.may_draw(sender) {
            debug!(session_id = %self.session_id, player_id = %sender, "stroke from non-drawer dropped");
            return out;
        }
        out.push(Recipient::AllExcept(sender), ServerEvent::RemoteDraw(stroke));
        out
    }

    pub fn clear_canvas(&mut self, sender: PlayerId) -> Outbox {
        let mut out = Outbox::new();
        if !self.engine.may_draw(sender) {
            debug!(session_id = %self.session_id, player_id = %sender, "clear from non-drawer dropped");
            return out;
        }
        out.to_all(ServerEvent::RemoteClear {});
        out
    }

    pub fn send_message(&mut self, sender: PlayerId, text: &str) -> Outbox {
        let mut out = Outbox::new();
        let Some(user) = self.roster.name_of(sender).map(str::to_string) else {
            debug!(session_id = %self.session_id, player_id = %sender, "message before join dropped");
            return out;
        };
        let text = truncate(text.trim(), self.config.max_message_len);
        if text.is_empty() {
            return out;
        }

        match self.engine.judge(sender, &text) {
            Verdict::Correct { points } => {
                self.engine.award(&mut self.roster, sender, points, &mut out);
            }
            Verdict::Chat => {
                out.to_all(ServerEvent::NewMessage {
                    user,
                    text,
                    kind: MessageKind::Chat,
                });
            }
        }
        out
    }

    /// Remove `sender` from the session. A no-op for unknown identities.
    pub fn disconnect(&mut self, sender: PlayerId) -> Outbox {
        let mut out = Outbox::new();
        let Some(player) = self.roster.remove(sender) else {
            return out;
        };
        info!(
            session_id = %self.session_id,
            player_id = %sender,
            players = self.roster.len(),
            "player left"
        );

        out.to_all(ServerEvent::PlayerListUpdate(self.roster.snapshot()));
        out.system(format!("{} left the game", player.name));
        self.engine.on_leave(&self.roster, sender, &mut out);
        out
    }

    /// Feed a round clock firing to the engine.
    pub fn on_timer(&mut self, fired: Fired) -> Outbox {
        let mut out = Outbox::new();
        self.engine.on_timer(&self.roster, fired, &mut out);
        out
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            status: self.engine.status(),
            current_word: self.engine.word().map(str::to_string),
            drawer_id: self.engine.drawer(),
            timer: self.engine.timer(),
            winners: self.engine.winners().to_vec(),
            round: self.engine.round(),
            players: self.roster.snapshot(),
        }
    }
}

fn clean_name(name: &str, max_len: usize) -> String {
    let name = truncate(name.trim(), max_len);
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim_end().to_string()
}
