// Time is consulted in two places only:
// - Extension gate: the interest bonus at the first ply is granted only while
//   the mover's remaining clock is above `Weights::extension_gate_ms`.
// - Hard deadline (optional): once `hard_deadline_ms` has elapsed, nodes stop
//   descending and the root keeps only the moves it finished searching.

use std::time::Instant;

/// Wall clock for a single `think` call.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
    remaining_ms: u64,
    hard_deadline_ms: Option<u64>,
}

impl Clock {
    pub fn start(remaining_ms: u64, hard_deadline_ms: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            remaining_ms,
            hard_deadline_ms,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Budget left on the mover's clock, as the host would report it now.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms.saturating_sub(self.elapsed_ms())
    }

    pub fn budget_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn past_deadline(&self) -> bool {
        match self.hard_deadline_ms {
            Some(limit) => self.elapsed_ms() >= limit,
            None => false,
        }
    }
}
