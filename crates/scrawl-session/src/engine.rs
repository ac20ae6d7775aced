//! The round engine: Waiting → Active → Intermission state machine.
//!
//! The engine never touches a clock or a socket. Every transition writes
//! the events it causes into an [`Outbox`], together with the timer command
//! the hosting actor must apply, and bumps the epoch so firings armed for an
//! earlier state are recognised as stale.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use scrawl_protocol::{GameStateView, PlayerId, Recipient, ServerEvent, SessionId, SessionStatus};
use scrawl_tick::{Fired, TimerKind};
use tracing::{debug, info};

use crate::outbox::{Outbox, TimerCommand};
use crate::select::{RoundPick, Selector};
use crate::words::normalize_word;
use crate::{GameConfig, Roster, WordBank};

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    TimeUp,
    AllGuessed,
    DrawerLeft,
}

impl fmt::Display for RoundEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeUp => write!(f, "time_up"),
            Self::AllGuessed => write!(f, "all_guessed"),
            Self::DrawerLeft => write!(f, "drawer_left"),
        }
    }
}

/// Outcome of evaluating a chat line against the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A scoring guess worth this many points.
    Correct { points: u32 },
    /// Ordinary chat. Includes the answer from a sender who cannot score
    /// with it (drawer, repeat winner, late joiner).
    Chat,
}

pub struct RoundEngine {
    session_id: SessionId,
    config: Arc<GameConfig>,
    words: WordBank,
    selector: Box<dyn Selector>,

    status: SessionStatus,
    word: Option<String>,
    drawer: Option<PlayerId>,
    last_pick: Option<RoundPick>,
    timer: u32,
    winners: Vec<PlayerId>,
    /// Roster at round start; only these players may score.
    eligible: HashSet<PlayerId>,
    epoch: u64,
    round: u64,
}

impl RoundEngine {
    pub fn new(
        session_id: SessionId,
        config: Arc<GameConfig>,
        words: WordBank,
        selector: Box<dyn Selector>,
    ) -> Self {
        Self {
            session_id,
            config,
            words,
            selector,
            status: SessionStatus::Waiting,
            word: None,
            drawer: None,
            last_pick: None,
            timer: 0,
            winners: Vec::new(),
            eligible: HashSet::new(),
            epoch: 0,
            round: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The secret word. `Some` only while a round is active.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    pub fn drawer(&self) -> Option<PlayerId> {
        self.drawer
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn is_drawer(&self, player: PlayerId) -> bool {
        self.drawer == Some(player)
    }

    /// Whether `player` may emit strokes and canvas clears right now.
    pub fn may_draw(&self, player: PlayerId) -> bool {
        self.status.is_active() && self.is_drawer(player)
    }

    // -----------------------------------------------------------------------
    // State views
    // -----------------------------------------------------------------------

    /// The state as `viewer` is allowed to see it: the drawer gets the word,
    /// everyone else a masked hint.
    pub fn view_for(&self, viewer: PlayerId) -> GameStateView {
        let (current_word, word_hint) = match &self.word {
            Some(word) if self.is_drawer(viewer) => (Some(word.clone()), None),
            Some(word) => (None, Some(mask(word))),
            None => (None, None),
        };
        GameStateView {
            status: self.status,
            current_word,
            word_hint,
            drawer_id: self.drawer,
            timer: self.timer,
            winners: self.winners.clone(),
            round: self.round,
        }
    }

    /// The state with the word masked, fit for any recipient.
    pub fn public_view(&self) -> GameStateView {
        GameStateView {
            status: self.status,
            current_word: None,
            word_hint: self.word.as_deref().map(mask),
            drawer_id: self.drawer,
            timer: self.timer,
            winners: self.winners.clone(),
            round: self.round,
        }
    }

    /// Queue a state broadcast, split so only the drawer sees the word.
    pub fn broadcast_state(&self, out: &mut Outbox) {
        match (self.drawer, &self.word) {
            (Some(drawer), Some(_)) => {
                out.push(
                    Recipient::Player(drawer),
                    ServerEvent::GameStateUpdate(self.view_for(drawer)),
                );
                out.push(
                    Recipient::AllExcept(drawer),
                    ServerEvent::GameStateUpdate(self.public_view()),
                );
            }
            _ => out.to_all(ServerEvent::GameStateUpdate(self.public_view())),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a round if the session is waiting and has enough players.
    pub fn maybe_start(&mut self, roster: &Roster, out: &mut Outbox) {
        if self.status == SessionStatus::Waiting && roster.len() >= self.config.min_players {
            self.start_round(roster, out);
        }
    }

    fn start_round(&mut self, roster: &Roster, out: &mut Outbox) {
        let candidates = roster.ids();
        if candidates.is_empty() {
            return;
        }
        let pick = self
            .selector
            .pick_next(&candidates, &self.words, self.last_pick.as_ref());

        self.status = SessionStatus::Active;
        self.word = Some(pick.word.clone());
        self.drawer = Some(pick.drawer);
        self.timer = self.config.round_secs;
        self.winners.clear();
        self.eligible = candidates.into_iter().collect();
        self.epoch += 1;
        self.round += 1;
        self.last_pick = Some(pick);

        out.set_timer(TimerCommand::StartTicking { epoch: self.epoch });
        info!(
            session_id = %self.session_id,
            round = self.round,
            drawer = ?self.drawer,
            players = roster.len(),
            "round started"
        );

        self.broadcast_state(out);
        let drawer_name = self
            .drawer
            .and_then(|id| roster.name_of(id))
            .unwrap_or("Someone");
        out.system(format!("{drawer_name} is drawing now!"));
    }

    fn end_round(&mut self, reason: RoundEnd, out: &mut Outbox) {
        let word = self.word.take().unwrap_or_default();
        self.status = SessionStatus::Intermission;
        self.epoch += 1;
        out.set_timer(TimerCommand::StartDelay {
            epoch: self.epoch,
            after: self.config.intermission(),
        });
        info!(
            session_id = %self.session_id,
            round = self.round,
            %reason,
            winners = self.winners.len(),
            "round ended"
        );

        self.broadcast_state(out);
        let text = match reason {
            RoundEnd::TimeUp => format!("Time's up! The word was {word}"),
            RoundEnd::AllGuessed => format!("Everyone guessed it! The word was {word}"),
            RoundEnd::DrawerLeft => format!("The drawer left. The word was {word}"),
        };
        out.system(text);
    }

    /// Back to Waiting: cancel timers, clear the round.
    pub fn reset(&mut self, out: &mut Outbox) {
        self.status = SessionStatus::Waiting;
        self.word = None;
        self.drawer = None;
        self.timer = 0;
        self.winners.clear();
        self.eligible.clear();
        self.epoch += 1;
        out.set_timer(TimerCommand::Cancel);
        info!(session_id = %self.session_id, "session reset to waiting");

        self.broadcast_state(out);
        out.system("Waiting for more players...");
    }

    // -----------------------------------------------------------------------
    // Guesses
    // -----------------------------------------------------------------------

    /// Evaluate `text` from `sender`. Pure: no state changes.
    pub fn judge(&self, sender: PlayerId, text: &str) -> Verdict {
        let Some(word) = self.word.as_deref().filter(|_| self.status.is_active()) else {
            return Verdict::Chat;
        };
        if normalize_word(text) != word
            || self.is_drawer(sender)
            || self.winners.contains(&sender)
            || !self.eligible.contains(&sender)
        {
            return Verdict::Chat;
        }
        Verdict::Correct {
            points: self.timer.saturating_mul(self.config.score_multiplier),
        }
    }

    /// Apply a correct guess. Ends the round once every eligible guesser
    /// still present has scored.
    pub fn award(&mut self, roster: &mut Roster, sender: PlayerId, points: u32, out: &mut Outbox) {
        if self.winners.contains(&sender) {
            return;
        }
        let Some(score) = roster.award(sender, points) else {
            return;
        };
        self.winners.push(sender);

        let player_name = roster.name_of(sender).unwrap_or_default().to_string();
        info!(
            session_id = %self.session_id,
            player_id = %sender,
            points,
            score,
            "correct guess"
        );
        out.to_all(ServerEvent::CorrectGuess {
            player_name,
            players: roster.snapshot(),
        });
        self.broadcast_state(out);

        if self.all_guessed(roster) {
            self.end_round(RoundEnd::AllGuessed, out);
        }
    }

    fn all_guessed(&self, roster: &Roster) -> bool {
        self.eligible
            .iter()
            .filter(|id| !self.is_drawer(**id) && roster.contains(**id))
            .all(|id| self.winners.contains(id))
    }

    // -----------------------------------------------------------------------
    // Timers and departures
    // -----------------------------------------------------------------------

    /// Handle a round clock firing.
    pub fn on_timer(&mut self, roster: &Roster, fired: Fired, out: &mut Outbox) {
        if fired.epoch != self.epoch {
            debug!(
                session_id = %self.session_id,
                fired_epoch = fired.epoch,
                epoch = self.epoch,
                "stale timer discarded"
            );
            return;
        }

        match (fired.kind, self.status) {
            (TimerKind::Tick, SessionStatus::Active) => {
                self.timer = self.timer.saturating_sub(1);
                out.to_all(ServerEvent::TimerUpdate { timer: self.timer });
                if self.timer == 0 {
                    self.end_round(RoundEnd::TimeUp, out);
                }
            }
            (TimerKind::Delay, SessionStatus::Intermission) => {
                if roster.len() >= self.config.min_players {
                    self.start_round(roster, out);
                } else {
                    self.reset(out);
                }
            }
            (kind, status) => {
                debug!(
                    session_id = %self.session_id,
                    ?kind,
                    %status,
                    "timer firing does not apply to current status"
                );
            }
        }
    }

    /// React to `left` having been removed from the roster.
    ///
    /// A departing drawer ends the round before the minimum-roster check.
    pub fn on_leave(&mut self, roster: &Roster, left: PlayerId, out: &mut Outbox) {
        if self.is_drawer(left) {
            self.drawer = None;
            if self.status.is_active() {
                self.end_round(RoundEnd::DrawerLeft, out);
            }
        }

        if self.status != SessionStatus::Waiting && roster.len() < self.config.min_players {
            self.reset(out);
            return;
        }

        if self.status.is_active() && self.all_guessed(roster) {
            self.end_round(RoundEnd::AllGuessed, out);
        }
    }
}

/// Mask every letter and digit of `word` with `_`, keeping other characters,
/// separated by spaces: `"ICE CREAM"` → `"_ _ _   _ _ _ _ _"`.
fn mask(word: &str) -> String {
    word.chars()
        .map(|c| if c.is_alphanumeric() { '_' } else { c })
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}
