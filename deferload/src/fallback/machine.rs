//! Boundary state machine.
//!
//! Pure and clock-injected: every event carries the current instant, and the
//! machine reports the next deadline it needs to be woken at. The async
//! driver in [`boundary`](super::boundary) owns the timers.
//!
//! # State Machine
//!
//! ```text
//! Idle --[mount, content ready]--> Resolved
//! Idle --[mount, no show delay]--> ShowingFallback
//! Idle --[mount]--> AwaitingDelay
//! AwaitingDelay --[content ready]--> Resolved
//! AwaitingDelay --[delay elapsed]--> ShowingFallback
//! ShowingFallback --[content ready, floor reached]--> Resolved
//! ShowingFallback --[content ready]--> EnforcingMinDisplay
//! EnforcingMinDisplay --[floor reached]--> Resolved
//! any live phase --[load failed]--> Failed
//! any phase --[unmount]--> Unmounted
//! ```
//!
//! The minimum display floor is measured from mount.

use super::config::FallbackTimings;
use tokio::time::Instant;

/// Phase of one mounted boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPhase {
    Idle,
    AwaitingDelay { until: Instant },
    ShowingFallback,
    EnforcingMinDisplay { until: Instant },
    Resolved,
    Failed,
    Unmounted,
}

impl BoundaryPhase {
    /// True once no further transition (other than unmount) can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Failed | Self::Unmounted)
    }
}

/// What the boundary shows in a given phase.
///
/// Ordered: a mount only ever moves forward through these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visible {
    Nothing,
    Fallback,
    Content,
    Error,
}

/// Show-delay / minimum-display state machine.
#[derive(Clone, Debug)]
pub struct BoundaryMachine {
    timings: FallbackTimings,
    phase: BoundaryPhase,
    mounted_at: Option<Instant>,
    last_visible: Visible,
}

impl BoundaryMachine {
    pub fn new(timings: FallbackTimings) -> Self {
        Self {
            timings,
            phase: BoundaryPhase::Idle,
            mounted_at: None,
            last_visible: Visible::Nothing,
        }
    }

    pub fn phase(&self) -> BoundaryPhase {
        self.phase
    }

    /// Starts the mount. `content_ready` short-circuits to `Resolved`.
    pub fn mount(&mut self, now: Instant, content_ready: bool) -> Visible {
        if self.phase != BoundaryPhase::Idle {
            return self.visible();
        }
        self.mounted_at = Some(now);

        let next = if content_ready {
            BoundaryPhase::Resolved
        } else {
            match self.timings.show_delay {
                Some(delay) => BoundaryPhase::AwaitingDelay { until: now + delay },
                None => BoundaryPhase::ShowingFallback,
            }
        };
        self.transition(next)
    }

    /// Content became ready at `now`.
    pub fn content_ready(&mut self, now: Instant) -> Visible {
        let next = match self.phase {
            BoundaryPhase::AwaitingDelay { .. } => BoundaryPhase::Resolved,
            BoundaryPhase::ShowingFallback => {
                let floor = self.min_display_floor(now);
                if now >= floor {
                    BoundaryPhase::Resolved
                } else {
                    BoundaryPhase::EnforcingMinDisplay { until: floor }
                }
            }
            _ => return self.visible(),
        };
        self.transition(next)
    }

    /// Fires whichever timer is due at `now`; a no-op if none is.
    pub fn timer_elapsed(&mut self, now: Instant) -> Visible {
        let next = match self.phase {
            BoundaryPhase::AwaitingDelay { until } if now >= until => {
                BoundaryPhase::ShowingFallback
            }
            BoundaryPhase::EnforcingMinDisplay { until } if now >= until => {
                BoundaryPhase::Resolved
            }
            _ => return self.visible(),
        };
        self.transition(next)
    }

    /// The load failed; the error is shown without waiting on any floor.
    pub fn fail(&mut self) -> Visible {
        match self.phase {
            BoundaryPhase::Idle
            | BoundaryPhase::AwaitingDelay { .. }
            | BoundaryPhase::ShowingFallback
            | BoundaryPhase::EnforcingMinDisplay { .. } => self.transition(BoundaryPhase::Failed),
            _ => self.visible(),
        }
    }

    /// Unmounts from any phase, dropping pending deadlines.
    pub fn unmount(&mut self) {
        self.phase = BoundaryPhase::Unmounted;
    }

    /// Next instant at which [`timer_elapsed`](Self::timer_elapsed) must run.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            BoundaryPhase::AwaitingDelay { until }
            | BoundaryPhase::EnforcingMinDisplay { until } => Some(until),
            _ => None,
        }
    }

    /// What is on screen now. Unmounted keeps the last visible state.
    pub fn visible(&self) -> Visible {
        match self.phase {
            BoundaryPhase::Idle | BoundaryPhase::AwaitingDelay { .. } => Visible::Nothing,
            BoundaryPhase::ShowingFallback | BoundaryPhase::EnforcingMinDisplay { .. } => {
                Visible::Fallback
            }
            BoundaryPhase::Resolved => Visible::Content,
            BoundaryPhase::Failed => Visible::Error,
            BoundaryPhase::Unmounted => self.last_visible,
        }
    }

    fn min_display_floor(&self, now: Instant) -> Instant {
        self.mounted_at.unwrap_or(now) + self.timings.min_display
    }

    fn transition(&mut self, next: BoundaryPhase) -> Visible {
        tracing::trace!(from = ?self.phase, to = ?next, "Boundary transition");
        self.phase = next;
        let visible = self.visible();
        debug_assert!(visible >= self.last_visible, "boundary view regressed");
        self.last_visible = visible;
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn timings() -> FallbackTimings {
        FallbackTimings {
            show_delay: Some(ms(150)),
            min_display: ms(500),
        }
    }

    #[test]
    fn test_fast_load_never_shows_fallback() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(timings());

        assert_eq!(machine.mount(t0, false), Visible::Nothing);
        assert_eq!(machine.deadline(), Some(t0 + ms(150)));
        assert_eq!(machine.content_ready(t0 + ms(50)), Visible::Content);
        assert_eq!(machine.phase(), BoundaryPhase::Resolved);
        assert_eq!(machine.deadline(), None);
    }

    #[test]
    fn test_shown_fallback_respects_min_display() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(timings());
        machine.mount(t0, false);

        // Early timer wakeups are ignored.
        assert_eq!(machine.timer_elapsed(t0 + ms(100)), Visible::Nothing);
        assert_eq!(machine.timer_elapsed(t0 + ms(150)), Visible::Fallback);

        assert_eq!(machine.content_ready(t0 + ms(300)), Visible::Fallback);
        assert_eq!(
            machine.phase(),
            BoundaryPhase::EnforcingMinDisplay { until: t0 + ms(500) }
        );
        assert_eq!(machine.timer_elapsed(t0 + ms(500)), Visible::Content);
    }

    #[test]
    fn test_slow_load_swaps_immediately_after_floor() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(timings());
        machine.mount(t0, false);
        machine.timer_elapsed(t0 + ms(150));

        assert_eq!(machine.content_ready(t0 + ms(1000)), Visible::Content);
    }

    #[test]
    fn test_no_show_delay_shows_fallback_at_mount() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(FallbackTimings {
            show_delay: None,
            min_display: ms(500),
        });

        assert_eq!(machine.mount(t0, false), Visible::Fallback);
        assert_eq!(machine.content_ready(t0 + ms(10)), Visible::Fallback);
        assert_eq!(machine.deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn test_ready_at_mount_skips_suspension() {
        let mut machine = BoundaryMachine::new(timings());
        assert_eq!(machine.mount(Instant::now(), true), Visible::Content);
        assert!(machine.phase().is_terminal());
    }

    #[test]
    fn test_failure_is_immediate() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(timings());
        machine.mount(t0, false);
        machine.timer_elapsed(t0 + ms(150));

        assert_eq!(machine.fail(), Visible::Error);
        assert_eq!(machine.deadline(), None);
    }

    #[test]
    fn test_unmount_drops_deadline() {
        let t0 = Instant::now();
        let mut machine = BoundaryMachine::new(timings());
        machine.mount(t0, false);
        machine.unmount();

        assert_eq!(machine.deadline(), None);
        assert_eq!(machine.timer_elapsed(t0 + ms(200)), Visible::Nothing);
        assert_eq!(machine.content_ready(t0 + ms(200)), Visible::Nothing);
    }

    #[derive(Clone, Debug)]
    enum Event {
        Timer(u64),
        Ready(u64),
        Fail,
        Unmount,
    }

    fn event() -> impl Strategy<Value = Event> {
        prop_oneof![
            (0u64..2000).prop_map(Event::Timer),
            (0u64..2000).prop_map(Event::Ready),
            Just(Event::Fail),
            Just(Event::Unmount),
        ]
    }

    proptest! {
        /// Property: whatever the event order, the view never regresses.
        #[test]
        fn prop_visible_is_monotonic(
            show_delay in proptest::option::of(0u64..400),
            min_display in 0u64..1000,
            ready_at_mount in any::<bool>(),
            events in proptest::collection::vec(event(), 0..12),
        ) {
            let t0 = Instant::now();
            let mut machine = BoundaryMachine::new(FallbackTimings {
                show_delay: show_delay.map(ms),
                min_display: ms(min_display),
            });
            let mut last = machine.mount(t0, ready_at_mount);

            // Times only move forward.
            let mut clock = 0u64;
            for event in events {
                let visible = match event {
                    Event::Timer(dt) => { clock += dt; machine.timer_elapsed(t0 + ms(clock)) }
                    Event::Ready(dt) => { clock += dt; machine.content_ready(t0 + ms(clock)) }
                    Event::Fail => machine.fail(),
                    Event::Unmount => { machine.unmount(); machine.visible() }
                };
                prop_assert!(visible >= last, "{:?} after {:?}", visible, last);
                last = visible;
            }
        }

        /// Property: content never appears before the floor once a fallback was shown.
        #[test]
        fn prop_fallback_honours_floor(
            delay in 0u64..400,
            min_display in 0u64..1000,
            ready_after in 0u64..1500,
        ) {
            let t0 = Instant::now();
            let mut machine = BoundaryMachine::new(FallbackTimings {
                show_delay: Some(ms(delay)),
                min_display: ms(min_display),
            });
            machine.mount(t0, false);
            let shown = ready_after > delay;
            if shown {
                machine.timer_elapsed(t0 + ms(delay));
            }
            let visible = machine.content_ready(t0 + ms(ready_after));

            if !shown {
                prop_assert_eq!(visible, Visible::Content);
            } else if ready_after < min_display {
                prop_assert_eq!(visible, Visible::Fallback);
                prop_assert_eq!(machine.deadline(), Some(t0 + ms(min_display)));
            } else {
                prop_assert_eq!(visible, Visible::Content);
            }
        }
    }
}
