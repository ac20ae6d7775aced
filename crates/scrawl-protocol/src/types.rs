//! Core protocol types for Scrawl's wire format.
//!
//! Everything in this module travels between the session server and the
//! browser clients. Events are JSON objects of the shape
//! `{ "event": "<name>", "data": <payload> }`, which maps one-to-one onto
//! the event names a pub/sub client subscribes to.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// The transport binds one identity to one connection for the lifetime of
/// that connection, so this is effectively an opaque connection id.
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for one running game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// The session coordinator pairs every outbound event with a `Recipient`;
/// the hosting actor resolves it against the connections it knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every participant in the session.
    All,

    /// One specific participant.
    Player(PlayerId),

    /// Everyone except the given participant (e.g. stroke relays, which
    /// the drawer already rendered locally).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Player records
// ---------------------------------------------------------------------------

/// Avatar descriptor chosen by the client.
///
/// Only `base` is named; every other field (hat, glasses, colour...) is
/// collected into `accessories` and passed through untouched. The engine
/// never interprets any of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(default)]
    pub base: String,

    #[serde(flatten)]
    pub accessories: BTreeMap<String, serde_json::Value>,
}

/// A participant as seen by every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: Avatar,
    /// Never decreases within a session.
    pub score: u32,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Lifecycle status of a session.
///
/// ```text
///            roster >= min            timer 0 / all guessed / drawer left
/// Waiting ─────────────────→ Active ──────────────────────────────────→ Intermission
///    ↑                        ↑                                             │
///    │                        └──────────── delay elapsed, roster >= min ───┘
///    └──────────────────── roster < min (from any state) ───────────────────
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No round in progress; not enough players.
    #[default]
    Waiting,
    /// A round is running and the timer is counting down.
    Active,
    /// The round just ended; the next one starts after a short pause.
    Intermission,
}

impl SessionStatus {
    /// Returns `true` while a round is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Intermission => write!(f, "intermission"),
        }
    }
}

/// Session state as delivered to one recipient.
///
/// The drawer's copy carries `current_word`; everyone else gets a masked
/// `word_hint` of the same shape (`"_ _ _ _ _"`) so the answer cannot be
/// read out of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub status: SessionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_word: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_hint: Option<String>,

    pub drawer_id: Option<PlayerId>,

    pub timer: u32,

    pub winners: Vec<PlayerId>,

    /// Round counter, starting at 1 for the first round of the session.
    pub round: u64,
}

/// Kind of a `new_message` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Something a player typed.
    Chat,
    /// An announcement generated by the session.
    System,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a client sends to the session.
///
/// `#[serde(tag = "event", content = "data")]` gives the adjacently tagged
/// form `{ "event": "send_message", "data": { "text": "apple" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Enter the session with a display name and avatar.
    JoinGame {
        #[serde(default)]
        name: String,
        #[serde(rename = "avatarAttrs", default)]
        avatar: Avatar,
    },

    /// A stroke segment. Opaque to the server, relayed verbatim.
    DrawStroke(serde_json::Value),

    /// Wipe the shared canvas.
    ClearCanvas {},

    /// Chat line or guess, depending on the session state.
    SendMessage { text: String },
}

/// Events the session sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full roster snapshot.
    PlayerListUpdate(Vec<Player>),

    /// Session state, tailored to the recipient.
    GameStateUpdate(GameStateView),

    /// A stroke from the drawer.
    RemoteDraw(serde_json::Value),

    /// Clear the canvas.
    RemoteClear {},

    /// Chat line or system announcement.
    NewMessage {
        user: String,
        text: String,
        #[serde(rename = "type")]
        kind: MessageKind,
    },

    /// Someone guessed the word; carries the updated scores.
    CorrectGuess {
        #[serde(rename = "playerName")]
        player_name: String,
        players: Vec<Player>,
    },

    /// Seconds left in the current round.
    TimerUpdate { timer: u32 },
}

impl ServerEvent {
    /// The wire name of this event, handy for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerListUpdate(_) => "player_list_update",
            Self::GameStateUpdate(_) => "game_state_update",
            Self::RemoteDraw(_) => "remote_draw",
            Self::RemoteClear {} => "remote_clear",
            Self::NewMessage { .. } => "new_message",
            Self::CorrectGuess { .. } => "correct_guess",
            Self::TimerUpdate { .. } => "timer_update",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! the serde attributes down.

    use serde_json::json;

    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(SessionId(3).to_string(), "S-3");
    }

    #[test]
    fn test_join_game_parses_avatar_attrs() {
        let raw = json!({
            "event": "join_game",
            "data": {
                "name": "ada",
                "avatarAttrs": { "base": "cat", "hat": "beret", "size": 2 }
            }
        });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();

        let ClientEvent::JoinGame { name, avatar } = event else {
            panic!("expected JoinGame");
        };
        assert_eq!(name, "ada");
        assert_eq!(avatar.base, "cat");
        assert_eq!(avatar.accessories["hat"], "beret");
        assert_eq!(avatar.accessories["size"], 2);
    }

    #[test]
    fn test_join_game_without_avatar_uses_default() {
        let raw = json!({ "event": "join_game", "data": { "name": "bo" } });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinGame {
                name: "bo".into(),
                avatar: Avatar::default(),
            }
        );
    }

    #[test]
    fn test_draw_stroke_keeps_payload_opaque() {
        let stroke = json!({ "x0": 1, "y0": 2, "x1": 3, "y1": 4, "color": "#f00" });
        let raw = json!({ "event": "draw_stroke", "data": stroke.clone() });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event, ClientEvent::DrawStroke(stroke));
    }

    #[test]
    fn test_clear_canvas_and_send_message_parse() {
        let clear: ClientEvent =
            serde_json::from_value(json!({ "event": "clear_canvas", "data": {} }))
                .unwrap();
        assert_eq!(clear, ClientEvent::ClearCanvas {});

        let msg: ClientEvent = serde_json::from_value(
            json!({ "event": "send_message", "data": { "text": "apple" } }),
        )
        .unwrap();
        assert_eq!(msg, ClientEvent::SendMessage { text: "apple".into() });
    }

    #[test]
    fn test_unknown_client_event_is_rejected() {
        let raw = json!({ "event": "fly_to_moon", "data": {} });
        assert!(serde_json::from_value::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn test_game_state_for_guesser_omits_word() {
        let view = GameStateView {
            status: SessionStatus::Active,
            current_word: None,
            word_hint: Some("_ _ _".into()),
            drawer_id: Some(PlayerId(1)),
            timer: 60,
            winners: vec![],
            round: 1,
        };
        let json = serde_json::to_value(ServerEvent::GameStateUpdate(view)).unwrap();

        assert_eq!(json["event"], "game_state_update");
        assert_eq!(json["data"]["status"], "active");
        assert_eq!(json["data"]["drawerId"], 1);
        assert_eq!(json["data"]["wordHint"], "_ _ _");
        assert!(json["data"].get("currentWord").is_none());
    }

    #[test]
    fn test_waiting_state_has_null_drawer() {
        let view = GameStateView {
            status: SessionStatus::Waiting,
            current_word: None,
            word_hint: None,
            drawer_id: None,
            timer: 0,
            winners: vec![],
            round: 0,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "waiting");
        assert!(json["drawerId"].is_null());
    }

    #[test]
    fn test_new_message_uses_type_field() {
        let event = ServerEvent::NewMessage {
            user: "System".into(),
            text: "hi".into(),
            kind: MessageKind::System,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new_message");
        assert_eq!(json["data"]["type"], "system");
    }

    #[test]
    fn test_correct_guess_shape() {
        let players = vec![Player {
            id: PlayerId(2),
            name: "bo".into(),
            avatar: Avatar::default(),
            score: 450,
        }];
        let event = ServerEvent::CorrectGuess {
            player_name: "bo".into(),
            players,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["playerName"], "bo");
        assert_eq!(json["data"]["players"][0]["score"], 450);
    }

    #[test]
    fn test_player_list_update_is_an_array() {
        let json = serde_json::to_value(ServerEvent::PlayerListUpdate(vec![])).unwrap();
        assert_eq!(json["event"], "player_list_update");
        assert!(json["data"].is_array());
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let events = [
            ServerEvent::RemoteClear {},
            ServerEvent::TimerUpdate { timer: 3 },
            ServerEvent::RemoteDraw(json!({})),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.name());
        }
    }
}
