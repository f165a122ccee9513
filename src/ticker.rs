use std::time::{Duration, Instant};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 330;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Periodic tick that only exists while a task is running.
///
/// The event loop asks [`Ticker::timeout`] how long it may block and calls
/// [`Ticker::poll`] after waking up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticker {
    Idle,
    Running { interval: Duration, next_due: Instant },
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::Idle
    }
}

impl Ticker {
    /// Start ticking. A ticker that is already running keeps its schedule.
    pub fn activate(&mut self, interval: Duration, now: Instant) {
        if let Ticker::Idle = self {
            *self = Ticker::Running {
                interval,
                next_due: now + interval,
            };
        }
    }

    pub fn deactivate(&mut self) {
        *self = Ticker::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Ticker::Running { .. })
    }

    /// True when a tick is due; schedules the next one
    pub fn poll(&mut self, now: Instant) -> bool {
        match self {
            Ticker::Idle => false,
            Ticker::Running { interval, next_due } => {
                if now < *next_due {
                    return false;
                }
                // Skip missed ticks instead of firing a burst
                while *next_due <= now {
                    *next_due += *interval;
                }
                true
            }
        }
    }

    /// How long the event loop may wait before the next tick
    pub fn timeout(&self, now: Instant, idle: Duration) -> Duration {
        match self {
            Ticker::Idle => idle,
            Ticker::Running { next_due, .. } => next_due.saturating_duration_since(now),
        }
    }
}
