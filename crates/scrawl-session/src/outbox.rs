//! Output of one coordinator step: addressed events plus a timer command.

use std::time::Duration;

use scrawl_protocol::{MessageKind, PlayerId, Recipient, ServerEvent};

/// Display name used for announcements generated by the session.
pub const SYSTEM_USER: &str = "System";

/// What the hosting actor should do with its round clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Start the per-second countdown for the given epoch.
    StartTicking { epoch: u64 },
    /// Arm the intermission delay for the given epoch.
    StartDelay { epoch: u64, after: Duration },
    /// Disarm whatever is pending.
    Cancel,
}

/// Events produced by a single coordinator operation, in emission order.
///
/// Only the last timer command survives: a step may end a round and then
/// reset the session, and only the final state's timer matters.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<(Recipient, ServerEvent)>,
    timer: Option<TimerCommand>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recipient: Recipient, event: ServerEvent) {
        self.events.push((recipient, event));
    }

    pub fn to_all(&mut self, event: ServerEvent) {
        self.push(Recipient::All, event);
    }

    pub fn to_player(&mut self, player: PlayerId, event: ServerEvent) {
        self.push(Recipient::Player(player), event);
    }

    /// Broadcast a system announcement.
    pub fn system(&mut self, text: impl Into<String>) {
        self.to_all(system_message(text));
    }

    /// Send a system announcement to one player only.
    pub fn system_to(&mut self, player: PlayerId, text: impl Into<String>) {
        self.to_player(player, system_message(text));
    }

    pub fn set_timer(&mut self, command: TimerCommand) {
        self.timer = Some(command);
    }

    pub fn events(&self) -> &[(Recipient, ServerEvent)] {
        &self.events
    }

    pub fn timer(&self) -> Option<TimerCommand> {
        self.timer
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.timer.is_none()
    }

    pub fn into_parts(self) -> (Vec<(Recipient, ServerEvent)>, Option<TimerCommand>) {
        (self.events, self.timer)
    }
}

fn system_message(text: impl Into<String>) -> ServerEvent {
    ServerEvent::NewMessage {
        user: SYSTEM_USER.to_string(),
        text: text.into(),
        kind: MessageKind::System,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_emission_order() {
        let mut out = Outbox::new();
        out.to_all(ServerEvent::RemoteClear {});
        out.system_to(PlayerId(2), "hello");
        out.push(Recipient::AllExcept(PlayerId(1)), ServerEvent::TimerUpdate { timer: 3 });

        let recipients: Vec<&Recipient> = out.events().iter().map(|(r, _)| r).collect();
        assert_eq!(
            recipients,
            [
                &Recipient::All,
                &Recipient::Player(PlayerId(2)),
                &Recipient::AllExcept(PlayerId(1)),
            ]
        );
    }

    #[test]
    fn test_last_timer_command_wins() {
        let mut out = Outbox::new();
        assert!(out.is_empty());
        out.set_timer(TimerCommand::StartDelay {
            epoch: 4,
            after: Duration::from_secs(5),
        });
        out.set_timer(TimerCommand::Cancel);
        assert_eq!(out.timer(), Some(TimerCommand::Cancel));
        assert!(!out.is_empty());
    }

    #[test]
    fn test_system_message_shape() {
        let mut out = Outbox::new();
        out.system("round over");
        let (events, _) = out.into_parts();
        assert_eq!(
            events[0].1,
            ServerEvent::NewMessage {
                user: "System".into(),
                text: "round over".into(),
                kind: MessageKind::System,
            }
        );
    }
}
