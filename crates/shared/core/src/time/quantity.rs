use std::fmt;
use std::iter::FusedIterator;

/// Number of fine-grained units in one coarse unit (µs per ms, subticks per tick)
pub const FINE_PER_COARSE: i64 = 1000;

/// Shared behaviour of the two time-unit families
///
/// Implementors are small tagged values (fine or coarse) that resolve to a
/// canonical fine-grained count. Everything else - comparison, arithmetic,
/// boundary iteration - is defined on that count.
pub trait TimeQuantity: Copy + Ord + fmt::Debug {
    /// The unique zero value
    const ZERO: Self;

    /// Canonical count of fine-grained units
    fn fine_count(&self) -> i64;

    /// Build a value tagged as a fine-grained count
    fn from_fine(count: i64) -> Self;

    /// Build a value tagged as a coarse-grained count
    fn from_coarse(count: i64) -> Self;

    /// Whether the value is tagged coarse
    fn is_coarse(&self) -> bool;

    fn is_zero(&self) -> bool {
        self.fine_count() == 0
    }

    /// True iff the fine count is divisible by [`FINE_PER_COARSE`]
    fn contains_whole_coarse_unit(&self) -> bool {
        self.fine_count().rem_euclid(FINE_PER_COARSE) == 0
    }

    /// Whole coarse units contained, rounded towards negative infinity
    fn whole_coarse_units(&self) -> i64 {
        self.fine_count().div_euclid(FINE_PER_COARSE)
    }

    /// Fine units past the last whole coarse unit (always in `0..1000`)
    fn fine_remainder(&self) -> i64 {
        self.fine_count().rem_euclid(FINE_PER_COARSE)
    }

    /// Signed number of fine-unit steps from `self` to `other`
    fn distance_to(&self, other: &Self) -> i64 {
        other.fine_count().saturating_sub(self.fine_count())
    }

    /// Value `steps` fine units away from `self`
    fn advanced_by(&self, steps: i64) -> Self {
        if steps == 0 {
            return *self;
        }
        Self::from_fine(self.fine_count().saturating_add(steps))
    }

    /// Inclusive unit-stride sequence from `self` to `end`
    ///
    /// Descends when `end < self`. Always yields at least `self`.
    fn stride_to(self, end: Self) -> Boundaries<Self> {
        Boundaries::new(self, end)
    }
}

/// Inclusive ±1 fine-unit iterator produced by [`TimeQuantity::stride_to`]
#[derive(Debug, Clone)]
pub struct Boundaries<Q> {
    next: i64,
    step: i64,
    remaining: u64,
    _unit: std::marker::PhantomData<Q>,
}

impl<Q: TimeQuantity> Boundaries<Q> {
    fn new(start: Q, end: Q) -> Self {
        let distance = start.distance_to(&end);
        Self {
            next: start.fine_count(),
            step: if distance < 0 { -1 } else { 1 },
            remaining: distance.unsigned_abs().saturating_add(1),
            _unit: std::marker::PhantomData,
        }
    }
}

impl<Q: TimeQuantity> Iterator for Boundaries<Q> {
    type Item = Q;

    fn next(&mut self) -> Option<Q> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.next;
        self.next = self.next.wrapping_add(self.step);
        self.remaining -= 1;
        Some(Q::from_fine(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (len, Some(len))
    }
}

impl<Q: TimeQuantity> DoubleEndedIterator for Boundaries<Q> {
    fn next_back(&mut self) -> Option<Q> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let offset = i64::try_from(self.remaining).unwrap_or(i64::MAX);
        Some(Q::from_fine(self.next + self.step * offset))
    }
}

impl<Q: TimeQuantity> ExactSizeIterator for Boundaries<Q> {}

impl<Q: TimeQuantity> FusedIterator for Boundaries<Q> {}

/// Implements [`TimeQuantity`], canonical comparison and zero-aware arithmetic
/// for a two-variant `(fine, coarse)` enum.
macro_rules! time_quantity {
    ($name:ident, $fine:ident => $fine_suffix:literal, $coarse:ident => $coarse_suffix:literal) => {
        impl $crate::time::TimeQuantity for $name {
            const ZERO: Self = $name::$fine(0);

            fn fine_count(&self) -> i64 {
                match *self {
                    $name::$fine(count) => count,
                    $name::$coarse(count) => {
                        count.saturating_mul($crate::time::FINE_PER_COARSE)
                    }
                }
            }

            fn from_fine(count: i64) -> Self {
                $name::$fine(count)
            }

            fn from_coarse(count: i64) -> Self {
                $name::$coarse(count)
            }

            fn is_coarse(&self) -> bool {
                matches!(self, $name::$coarse(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <$name as $crate::time::TimeQuantity>::ZERO
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                use $crate::time::TimeQuantity;
                self.fine_count() == other.fine_count()
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                use $crate::time::TimeQuantity;
                std::hash::Hash::hash(&self.fine_count(), state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                use $crate::time::TimeQuantity;
                self.fine_count().cmp(&other.fine_count())
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                use $crate::time::TimeQuantity;
                if rhs.is_zero() {
                    return self;
                }
                if self.is_zero() {
                    return rhs;
                }
                match (self, rhs) {
                    ($name::$coarse(a), $name::$coarse(b)) => $name::$coarse(a.saturating_add(b)),
                    _ => $name::$fine(self.fine_count().saturating_add(rhs.fine_count())),
                }
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                use $crate::time::TimeQuantity;
                if rhs.is_zero() {
                    return self;
                }
                if self == rhs {
                    return Self::ZERO;
                }
                if self.is_zero() {
                    return -rhs;
                }
                match (self, rhs) {
                    ($name::$coarse(a), $name::$coarse(b)) => $name::$coarse(a.saturating_sub(b)),
                    _ => $name::$fine(self.fine_count().saturating_sub(rhs.fine_count())),
                }
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                match self {
                    $name::$fine(count) => $name::$fine(count.saturating_neg()),
                    $name::$coarse(count) => $name::$coarse(count.saturating_neg()),
                }
            }
        }

        impl std::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl std::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                use $crate::time::TimeQuantity;
                iter.fold(Self::ZERO, |acc, value| acc + value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $name::$fine(count) => write!(f, "{}{}", count, $fine_suffix),
                    $name::$coarse(count) => write!(f, "{}{}", count, $coarse_suffix),
                }
            }
        }
    };
}

pub(crate) use time_quantity;
