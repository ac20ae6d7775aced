//! Session coordination for Scrawl.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns the
//! roster, the round engine, and a round clock.
//!
//! # Key types
//!
//! - [`SessionCoordinator`] — authorizes and dispatches client events
//! - [`RoundEngine`] — the Waiting/Active/Intermission state machine
//! - [`Roster`] — who is playing, with scores
//! - [`WordBank`] — shared, immutable candidate words
//! - [`Selector`] — pluggable "pick next drawer and word" strategy
//! - [`SessionManager`] — creates/destroys sessions, routes players
//! - [`SessionHandle`] — send commands to a running session actor
//! - [`GameConfig`] — timings, scoring, limits, word list

mod actor;
mod config;
mod coordinator;
mod engine;
mod error;
mod manager;
mod outbox;
mod roster;
mod select;
mod words;

pub use actor::{PlayerSender, SessionHandle, SessionInfo};
pub use config::{GameConfig, SelectionPolicy};
pub use coordinator::{DEFAULT_PLAYER_NAME, SessionCoordinator, SessionSnapshot};
pub use engine::{RoundEnd, RoundEngine, Verdict};
pub use error::SessionError;
pub use manager::SessionManager;
pub use outbox::{Outbox, SYSTEM_USER, TimerCommand};
pub use roster::Roster;
pub use select::{RandomSelector, RotatingSelector, RoundPick, Selector};
pub use words::{DEFAULT_WORDS, WordBank, normalize_word};
