//! Hadron Core
//!
//! Pure time value types for the Hadron physics sandbox.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! ## Units
//!
//! ```text
//! wall clock        scheduler
//! ──────────        ─────────
//! Duration          Subticking
//!   Microseconds      Subticks   (fine,   1/1000 of coarse)
//!   Milliseconds      Ticks      (coarse)
//! ```
//!
//! Both families resolve to a canonical fine-grained count for every
//! comparison and arithmetic operation.

pub mod events;
pub mod time;

// Re-export commonly used types at crate root
pub use events::TickEvent;
pub use time::{Boundaries, Duration, FINE_PER_COARSE, Subticking, TimeQuantity};
