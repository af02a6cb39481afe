//! Shared rate accumulation across extraction workers

use crate::{RateResult, RunningTotals, StatusClass};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Running totals guarded for concurrent workers.
///
/// Counters only ever grow; merges are commutative, so the final totals do
/// not depend on worker count or completion order.
#[derive(Debug, Default)]
pub struct RateAccumulator {
    totals: Mutex<RunningTotals>,
}

impl RateAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified record.
    pub fn record(&self, class: StatusClass) {
        self.lock().record(class);
    }

    /// Fold a worker's per-object totals in under a single lock.
    pub fn merge(&self, local: &RunningTotals) {
        self.lock().merge(local);
    }

    #[must_use]
    pub fn totals(&self) -> RunningTotals {
        *self.lock()
    }

    /// Point-in-time rates; all zero while nothing has been counted.
    #[must_use]
    pub fn snapshot(&self) -> RateResult {
        self.lock().rates()
    }

    #[must_use]
    pub fn into_totals(self) -> RunningTotals {
        self.totals
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, RunningTotals> {
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
