//! Cancellable round clock for Scrawl sessions.
//!
//! A session needs exactly two kinds of timer: a repeating one-second tick
//! while a round is running, and a one-shot delay during the intermission.
//! At most one of them is armed at a time, so both live in one
//! [`RoundClock`].
//!
//! # Epochs
//!
//! Every arm call is tagged with the caller's epoch (the round engine's
//! generation counter) and every [`Fired`] carries it back. A firing whose
//! epoch no longer matches the engine is stale and gets discarded, so a
//! tick scheduled before a reset can never act on the state after it.
//!
//! # Integration
//!
//! The clock sits inside the session actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands, re-arm or cancel */ }
//!         fired = clock.wait() => { /* hand `fired` to the coordinator */ }
//!     }
//! }
//! ```
//!
//! [`RoundClock::wait`] is cancel-safe: the clock is only mutated after the
//! deadline has elapsed, so dropping the future when another branch wins
//! leaves the schedule untouched.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Schedule the next tick one interval from now. Missed ticks are not
    /// replayed, so a stalled runtime never produces a burst of countdown
    /// updates.
    #[default]
    Skip,
    /// Keep the original cadence: the next tick fires one interval after
    /// the missed deadline.
    Drop,
}

/// Configuration for the round clock.
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Interval between countdown ticks. Default: 1 second.
    pub tick_interval: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            policy: TickPolicy::default(),
        }
    }
}

impl ClockConfig {
    /// Shortest tick interval the clock accepts.
    pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

    /// Create a config with a specific tick interval.
    pub fn with_interval(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values. Called by [`RoundClock::new`].
    pub fn validated(mut self) -> Self {
        if self.tick_interval < Self::MIN_TICK_INTERVAL {
            warn!(
                interval_ms = self.tick_interval.as_millis() as u64,
                min_ms = Self::MIN_TICK_INTERVAL.as_millis() as u64,
                "tick interval below minimum, clamping"
            );
            self.tick_interval = Self::MIN_TICK_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Firings
// ---------------------------------------------------------------------------

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// A countdown tick. The clock stays armed for the next one.
    Tick,
    /// The one-shot intermission delay. The clock disarms itself.
    Delay,
}

/// A timer firing, returned by [`RoundClock::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    /// Epoch the timer was armed with.
    pub epoch: u64,
    /// Which timer fired.
    pub kind: TimerKind,
    /// `true` if the firing was more than 10% of an interval late.
    pub overrun: bool,
}

#[derive(Debug, Clone, Copy)]
enum Armed {
    Ticking { epoch: u64, next: Instant },
    Delay { epoch: u64, deadline: Instant },
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// One per session actor. Holds at most one armed timer.
pub struct RoundClock {
    config: ClockConfig,
    armed: Option<Armed>,
    fired: u64,
}

impl RoundClock {
    /// Create an idle clock.
    pub fn new(config: ClockConfig) -> Self {
        let config = config.validated();
        debug!(
            interval_ms = config.tick_interval.as_millis() as u64,
            policy = ?config.policy,
            "round clock created"
        );
        Self {
            config,
            armed: None,
            fired: 0,
        }
    }

    /// Create an idle clock with the given tick interval and default policy.
    pub fn with_interval(tick_interval: Duration) -> Self {
        Self::new(ClockConfig::with_interval(tick_interval))
    }

    /// Start (or restart) the countdown tick. The first tick fires one
    /// interval from now. Replaces whatever was armed before.
    pub fn start_ticking(&mut self, epoch: u64) {
        let next = Instant::now() + self.config.tick_interval;
        self.armed = Some(Armed::Ticking { epoch, next });
        trace!(epoch, "countdown armed");
    }

    /// Arm the one-shot delay. Replaces whatever was armed before.
    pub fn start_delay(&mut self, epoch: u64, after: Duration) {
        let deadline = Instant::now() + after;
        self.armed = Some(Armed::Delay { epoch, deadline });
        trace!(epoch, after_ms = after.as_millis() as u64, "delay armed");
    }

    /// Disarm the clock. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            trace!(epoch = armed.epoch(), "clock cancelled");
        }
    }

    /// Wait for the armed timer. Pends forever while the clock is idle, so
    /// `tokio::select!` keeps serving its other branches.
    pub async fn wait(&mut self) -> Fired {
        let Some(armed) = self.armed else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        match armed {
            Armed::Ticking { epoch, next } => {
                time::sleep_until(next).await;

                let now = Instant::now();
                let interval = self.config.tick_interval;
                let late_by = now.saturating_duration_since(next);
                let overrun = late_by > interval / 10;

                let following = match self.config.policy {
                    TickPolicy::Skip => now + interval,
                    TickPolicy::Drop => next + interval,
                };
                if overrun {
                    warn!(
                        epoch,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        policy = ?self.config.policy,
                        "countdown tick fired late"
                    );
                }
                self.armed = Some(Armed::Ticking {
                    epoch,
                    next: following,
                });
                self.fired += 1;
                Fired {
                    epoch,
                    kind: TimerKind::Tick,
                    overrun,
                }
            }
            Armed::Delay { epoch, deadline } => {
                time::sleep_until(deadline).await;
                self.armed = None;
                self.fired += 1;
                Fired {
                    epoch,
                    kind: TimerKind::Delay,
                    overrun: false,
                }
            }
        }
    }

    /// Epoch of the armed timer, if any.
    pub fn armed_epoch(&self) -> Option<u64> {
        self.armed.map(|a| a.epoch())
    }

    /// Whether a timer is armed.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether the countdown tick (as opposed to the delay) is armed.
    pub fn is_ticking(&self) -> bool {
        matches!(self.armed, Some(Armed::Ticking { .. }))
    }

    /// Total firings since creation.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// The configured tick interval.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }
}

impl Armed {
    fn epoch(&self) -> u64 {
        match self {
            Self::Ticking { epoch, .. } | Self::Delay { epoch, .. } => *epoch,
        }
    }
}
