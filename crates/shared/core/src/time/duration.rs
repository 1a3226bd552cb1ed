use serde::{Deserialize, Serialize};

use super::quantity::{TimeQuantity, time_quantity};

/// Wall-clock amount of time
///
/// Counts either whole microseconds or whole milliseconds. Comparison and
/// arithmetic always go through the microsecond count, so
/// `Milliseconds(2) == Microseconds(2000)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Duration {
    /// Fine-grained wall time
    Microseconds(i64),
    /// Coarse-grained wall time
    Milliseconds(i64),
}

time_quantity!(Duration, Microseconds => "µs", Milliseconds => "ms");

impl Duration {
    pub const fn microseconds(count: i64) -> Self {
        Duration::Microseconds(count)
    }

    pub const fn milliseconds(count: i64) -> Self {
        Duration::Milliseconds(count)
    }

    /// Total microseconds
    pub fn as_micros(&self) -> i64 {
        self.fine_count()
    }

    /// Convert to a std duration, saturating negative values to zero
    pub fn to_std(&self) -> std::time::Duration {
        u64::try_from(self.fine_count())
            .map(std::time::Duration::from_micros)
            .unwrap_or(std::time::Duration::ZERO)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        let micros = i64::try_from(value.as_micros()).unwrap_or(i64::MAX);
        if micros % super::FINE_PER_COARSE == 0 {
            Duration::Milliseconds(micros / super::FINE_PER_COARSE)
        } else {
            Duration::Microseconds(micros)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_equality() {
        assert_eq!(Duration::milliseconds(2), Duration::microseconds(2000));
        assert!(Duration::milliseconds(1) > Duration::microseconds(999));
        assert_eq!(Duration::Milliseconds(0), Duration::ZERO);
    }

    #[test]
    fn test_zero_short_circuits() {
        let ms = Duration::milliseconds(5);
        assert!(matches!(ms + Duration::ZERO, Duration::Milliseconds(5)));
        assert!(matches!(Duration::ZERO + ms, Duration::Milliseconds(5)));
        assert!(matches!(ms - Duration::ZERO, Duration::Milliseconds(5)));
    }

    #[test]
    fn test_equal_operands_cancel() {
        let a = Duration::milliseconds(3);
        let b = Duration::microseconds(3000);
        let diff = a - b;
        assert!(diff.is_zero());
        assert!(matches!(diff, Duration::Microseconds(0)));
    }

    #[test]
    fn test_mixed_arithmetic_is_fine_grained() {
        let sum = Duration::milliseconds(1) + Duration::microseconds(500);
        assert!(matches!(sum, Duration::Microseconds(1500)));

        let coarse = Duration::milliseconds(1) + Duration::milliseconds(2);
        assert!(matches!(coarse, Duration::Milliseconds(3)));
    }

    #[test]
    fn test_negative_results_are_kept() {
        let diff = Duration::microseconds(100) - Duration::milliseconds(1);
        assert_eq!(diff.as_micros(), -900);
        assert_eq!(diff.to_std(), std::time::Duration::ZERO);
    }

    #[test]
    fn test_std_conversion() {
        let from_std = Duration::from(std::time::Duration::from_millis(7));
        assert!(matches!(from_std, Duration::Milliseconds(7)));

        let odd = Duration::from(std::time::Duration::from_micros(1234));
        assert!(matches!(odd, Duration::Microseconds(1234)));

        assert_eq!(
            Duration::milliseconds(3).to_std(),
            std::time::Duration::from_millis(3)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Duration::milliseconds(2).to_string(), "2ms");
        assert_eq!(Duration::microseconds(1500).to_string(), "1500µs");
    }
}
