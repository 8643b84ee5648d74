//! Fixed-rate worker pacing from a monotonic clock.
//!
//! [`Periodic`] tracks the next deadline instead of sleeping a fixed
//! amount after the work, so a worker's cadence does not stretch by the
//! time its own work takes.  When a cycle overruns by more than a whole
//! period the schedule restarts from `now` rather than bursting to catch up.

#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    period_ms: u64,
    next_ms: u64,
}

impl Periodic {
    /// First deadline is `start_ms + period_ms`.
    pub fn new(start_ms: u64, period_ms: u32) -> Self {
        let period_ms = u64::from(period_ms.max(1));
        Self {
            period_ms,
            next_ms: start_ms + period_ms,
        }
    }

    /// Milliseconds to sleep before the next cycle; advances the deadline.
    pub fn wait_ms(&mut self, now_ms: u64) -> u64 {
        if now_ms >= self.next_ms + self.period_ms {
            // overran a whole period: resynchronise
            self.next_ms = now_ms + self.period_ms;
            return 0;
        }
        let wait = self.next_ms.saturating_sub(now_ms);
        self.next_ms += self.period_ms;
        wait
    }

    /// Change the period; takes effect from `now_ms`.
    pub fn set_period(&mut self, now_ms: u64, period_ms: u32) {
        let period_ms = u64::from(period_ms.max(1));
        if period_ms != self.period_ms {
            self.period_ms = period_ms;
            self.next_ms = now_ms + period_ms;
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}
