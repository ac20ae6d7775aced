//! Integration tests for the round clock.
//!
//! All timing tests run with `start_paused = true`: Tokio auto-advances the
//! paused clock whenever every task is idle, so `sleep_until` resolves
//! instantly and deterministically.

use std::time::Duration;

use scrawl_tick::{ClockConfig, Fired, RoundClock, TickPolicy, TimerKind};
use tokio::time::Instant;

// =========================================================================
// ClockConfig
// =========================================================================

#[test]
fn test_default_config_ticks_every_second() {
    let cfg = ClockConfig::default();
    assert_eq!(cfg.tick_interval, Duration::from_secs(1));
    assert_eq!(cfg.policy, TickPolicy::Skip);
}

#[test]
fn test_validated_clamps_tiny_interval() {
    let cfg = ClockConfig::with_interval(Duration::from_millis(1)).validated();
    assert_eq!(cfg.tick_interval, ClockConfig::MIN_TICK_INTERVAL);
}

#[test]
fn test_new_clock_is_idle() {
    let clock = RoundClock::with_interval(Duration::from_secs(1));
    assert!(!clock.is_armed());
    assert_eq!(clock.armed_epoch(), None);
    assert_eq!(clock.fired_count(), 0);
}

// =========================================================================
// Countdown ticks
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_fires_after_one_interval() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    let start = Instant::now();
    clock.start_ticking(3);

    let fired = clock.wait().await;

    assert_eq!(
        fired,
        Fired {
            epoch: 3,
            kind: TimerKind::Tick,
            overrun: false
        }
    );
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert!(clock.is_ticking(), "countdown stays armed after a tick");
}

#[tokio::test(start_paused = true)]
async fn test_ticks_repeat_at_fixed_cadence() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    let start = Instant::now();
    clock.start_ticking(1);

    for _ in 0..5 {
        let fired = clock.wait().await;
        assert_eq!(fired.kind, TimerKind::Tick);
    }
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(clock.fired_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_is_flagged_as_overrun() {
    let mut clock = RoundClock::new(ClockConfig {
        tick_interval: Duration::from_secs(1),
        policy: TickPolicy::Skip,
    });
    clock.start_ticking(1);

    // Stall past the deadline before polling.
    tokio::time::advance(Duration::from_millis(1500)).await;

    let fired = clock.wait().await;
    assert!(fired.overrun);
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_reschedules_from_now() {
    let mut clock = RoundClock::new(ClockConfig {
        tick_interval: Duration::from_secs(1),
        policy: TickPolicy::Skip,
    });
    let start = Instant::now();
    clock.start_ticking(1);
    tokio::time::advance(Duration::from_millis(2500)).await;

    clock.wait().await; // fires immediately at t=2.5s
    clock.wait().await; // next one is a full interval later

    assert_eq!(start.elapsed(), Duration::from_millis(3500));
}

#[tokio::test(start_paused = true)]
async fn test_drop_policy_keeps_original_cadence() {
    let mut clock = RoundClock::new(ClockConfig {
        tick_interval: Duration::from_secs(1),
        policy: TickPolicy::Drop,
    });
    let start = Instant::now();
    clock.start_ticking(1);
    tokio::time::advance(Duration::from_millis(1500)).await;

    clock.wait().await; // deadline was t=1s
    clock.wait().await; // next deadline is t=2s

    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

// =========================================================================
// Intermission delay
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_delay_fires_once_then_disarms() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    let start = Instant::now();
    clock.start_delay(7, Duration::from_secs(5));

    let fired = clock.wait().await;
    assert_eq!(fired.epoch, 7);
    assert_eq!(fired.kind, TimerKind::Delay);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(!clock.is_armed());

    let again = tokio::time::timeout(Duration::from_secs(60), clock.wait()).await;
    assert!(again.is_err(), "one-shot delay must not fire twice");
}

#[tokio::test(start_paused = true)]
async fn test_arming_replaces_previous_timer() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    clock.start_ticking(1);
    clock.start_delay(2, Duration::from_secs(5));

    let fired = clock.wait().await;
    assert_eq!(fired.epoch, 2);
    assert_eq!(fired.kind, TimerKind::Delay);
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_idle_clock_pends_forever() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    let result = tokio::time::timeout(Duration::from_secs(30), clock.wait()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_pending_delay() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    clock.start_delay(4, Duration::from_secs(5));
    clock.cancel();
    clock.cancel();

    assert!(!clock.is_armed());
    let result = tokio::time::timeout(Duration::from_secs(30), clock.wait()).await;
    assert!(result.is_err(), "cancelled delay must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_wait_is_cancel_safe_inside_select() {
    let mut clock = RoundClock::with_interval(Duration::from_secs(1));
    clock.start_ticking(9);

    // Another branch wins first; the clock must keep its schedule.
    tokio::select! {
        _ = clock.wait() => panic!("tick should not win"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }
    assert_eq!(clock.armed_epoch(), Some(9));

    let fired = clock.wait().await;
    assert_eq!(fired.epoch, 9);
}
