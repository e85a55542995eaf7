//! Fiscal calendar
//!
//! A simulation period is one round of tax collection. `periods_per_year`
//! consecutive periods make up a fiscal year, and the rate feedback rule runs
//! on the last period of each year:
//!
//! ```text
//! periods_per_year = 4
//! period:  0  1  2  3 | 4  5  6  7 | 8 ...
//! year:    0  0  0  0 | 1  1  1  1 | 2
//!                   ^            ^
//!              rates rescaled after collection
//! ```

use serde::{Deserialize, Serialize};

/// Position of the simulation in the fiscal calendar
///
/// ```
/// use stockflow_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(2);
/// assert!(!time.is_end_of_year());
/// time.advance_period();
/// assert!(time.is_end_of_year());
/// assert_eq!((time.current_period(), time.current_year()), (1, 0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    current_period: usize,
    periods_per_year: usize,
}

impl TimeManager {
    /// Calendar at period 0
    ///
    /// # Panics
    /// Panics if `periods_per_year` is zero. `Orchestrator::new` rejects such
    /// configs before building a calendar.
    pub fn new(periods_per_year: usize) -> Self {
        Self::at_period(periods_per_year, 0)
    }

    /// Calendar positioned at `current_period`, used when restoring a checkpoint
    pub fn at_period(periods_per_year: usize, current_period: usize) -> Self {
        assert!(periods_per_year > 0, "periods_per_year must be positive");
        Self {
            current_period,
            periods_per_year,
        }
    }

    pub fn advance_period(&mut self) {
        self.current_period += 1;
    }

    pub fn current_period(&self) -> usize {
        self.current_period
    }

    /// Fiscal year of the current period, starting at 0
    pub fn current_year(&self) -> usize {
        self.current_period / self.periods_per_year
    }

    pub fn period_within_year(&self) -> usize {
        self.current_period % self.periods_per_year
    }

    /// True on the period after which tax rates are rescaled
    pub fn is_end_of_year(&self) -> bool {
        (self.current_period + 1) % self.periods_per_year == 0
    }

    pub fn periods_per_year(&self) -> usize {
        self.periods_per_year
    }
}
