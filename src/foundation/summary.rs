use serde::Serialize;
use std::fmt;

/// Outcome counters for a tolerant batch loop.
///
/// Per-item failures never abort a batch, they end up here instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.attempted += 1;
        self.skipped += 1;
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "attempted {}, succeeded {}, skipped {}",
            self.attempted, self.succeeded, self.skipped
        )
    }
}
