use serde::{Deserialize, Serialize};

use crate::time::{Subticking, TimeQuantity};

/// One boundary visited while the clock advances
///
/// Delivered to every listener whose granularity admits `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickEvent {
    /// Elapsed time when the advancement began
    pub start: Subticking,
    /// Boundary one subtick before `current` (floored at zero);
    /// `None` only for the first notification of a session
    pub previous: Option<Subticking>,
    /// Boundary being notified
    pub current: Subticking,
    /// Elapsed time the advancement is heading to
    pub end: Subticking,
}

impl TickEvent {
    /// Whether `current` lands on a whole tick
    pub fn is_tick(&self) -> bool {
        self.current.is_whole_tick()
    }

    /// Fraction of the advancement already covered, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        let total = self.start.distance_to(&self.end);
        if total == 0 {
            return 1.0;
        }
        self.start.distance_to(&self.current) as f64 / total as f64
    }

    /// Interpolation factor of `current` inside its tick
    pub fn interpolation(&self) -> f64 {
        self.current.tick_fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(current: Subticking) -> TickEvent {
        TickEvent {
            start: Subticking::ticks(2),
            previous: Some(current - Subticking::subticks(1)),
            current,
            end: Subticking::ticks(4),
        }
    }

    #[test]
    fn test_progress() {
        assert_eq!(event(Subticking::ticks(2)).progress(), 0.0);
        assert_eq!(event(Subticking::ticks(3)).progress(), 0.5);
        assert_eq!(event(Subticking::ticks(4)).progress(), 1.0);
    }

    #[test]
    fn test_tick_and_interpolation() {
        let on_tick = event(Subticking::ticks(3));
        assert!(on_tick.is_tick());
        assert_eq!(on_tick.interpolation(), 0.0);

        let mid = event(Subticking::subticks(3500));
        assert!(!mid.is_tick());
        assert_eq!(mid.interpolation(), 0.5);
    }
}
