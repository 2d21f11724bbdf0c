use std::time::{Duration, Instant};

use crate::config::DEFAULT_POLL_INTERVAL;

/// Source of "now" for the scheduler.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Why a poll is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollReason {
    /// The update button; always honoured.
    Manual,
    /// The auto-update timer; may be skipped while a poll is still outstanding.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling { next_tick: Instant },
}

/// Decides when a poll should be sent: on demand, and periodically while auto-update is on.
///
/// It never does I/O itself. The owner asks `take_due_poll` every time it wakes up and sends a
/// poll request when it gets a `PollReason` back.
pub struct PollScheduler<C: Clock = SystemClock> {
    clock: C,
    interval: Duration,
    state: PollState,
    manual_pending: bool,
}

impl<C: Clock> PollScheduler<C> {
    /// `auto_update` is the initial checkbox value; if set, the first tick is due immediately.
    pub fn new(clock: C, interval: Duration, auto_update: bool) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let mut scheduler = Self {
            clock,
            interval,
            state: PollState::Idle,
            manual_pending: false,
        };
        if auto_update {
            scheduler.state = PollState::Polling {
                next_tick: scheduler.clock.now(),
            };
        }
        scheduler
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.state, PollState::Polling { .. })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Manual trigger (the update button). Works whether or not auto-update is on.
    pub fn trigger(&mut self) {
        self.manual_pending = true;
    }

    /// Checkbox toggled. Turning it on starts the periodic ticks one interval from now,
    /// turning it off only cancels future ticks.
    pub fn set_auto(&mut self, enabled: bool) {
        match (enabled, self.state) {
            (true, PollState::Idle) => {
                self.state = PollState::Polling {
                    next_tick: self.clock.now() + self.interval,
                };
            }
            (false, PollState::Polling { .. }) => self.state = PollState::Idle,
            _ => {}
        }
    }

    /// `Some` when a poll should be sent now. Consumes the pending trigger / tick; a manual
    /// trigger wins when both are due.
    ///
    /// Missed ticks are not replayed: after a long stall the next tick is one interval from now.
    pub fn take_due_poll(&mut self) -> Option<PollReason> {
        let now = self.clock.now();
        let mut due = std::mem::take(&mut self.manual_pending).then_some(PollReason::Manual);

        if let PollState::Polling { next_tick } = self.state {
            if now >= next_tick {
                due = due.or(Some(PollReason::Tick));
                let mut next = next_tick + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.state = PollState::Polling { next_tick: next };
            }
        }

        due
    }

    /// Time until the owner should wake up again, `None` if nothing is scheduled.
    pub fn time_until_next(&self) -> Option<Duration> {
        if self.manual_pending {
            return Some(Duration::ZERO);
        }
        match self.state {
            PollState::Idle => None,
            PollState::Polling { next_tick } => {
                Some(next_tick.saturating_duration_since(self.clock.now()))
            }
        }
    }
}
