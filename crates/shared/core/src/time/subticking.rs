use serde::{Deserialize, Serialize};

use super::Duration;
use super::quantity::{TimeQuantity, time_quantity};

/// Scheduler-internal amount of simulated time
///
/// A tick is one simulated millisecond and the coarse scheduling unit; a
/// subtick is 1/1000 of a tick. All comparison happens on the subtick count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Subticking {
    Subticks(i64),
    Ticks(i64),
}

time_quantity!(Subticking, Subticks => "st", Ticks => "t");

impl Subticking {
    pub const fn subticks(count: i64) -> Self {
        Subticking::Subticks(count)
    }

    pub const fn ticks(count: i64) -> Self {
        Subticking::Ticks(count)
    }

    /// Total subticks
    pub fn as_subticks(&self) -> i64 {
        self.fine_count()
    }

    /// True when the value lands on a full tick
    pub fn is_whole_tick(&self) -> bool {
        self.contains_whole_coarse_unit()
    }

    /// Position within the current tick as a fraction in `[0, 1)`
    pub fn tick_fraction(&self) -> f64 {
        self.fine_remainder() as f64 / super::FINE_PER_COARSE as f64
    }
}

impl From<Duration> for Subticking {
    fn from(value: Duration) -> Self {
        match value {
            Duration::Microseconds(count) => Subticking::Subticks(count),
            Duration::Milliseconds(count) => Subticking::Ticks(count),
        }
    }
}

impl From<Subticking> for Duration {
    fn from(value: Subticking) -> Self {
        match value {
            Subticking::Subticks(count) => Duration::Microseconds(count),
            Subticking::Ticks(count) => Duration::Milliseconds(count),
        }
    }
}
