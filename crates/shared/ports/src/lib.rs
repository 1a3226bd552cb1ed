//! Hadron Ports
//!
//! Port definitions (traits) for the Hadron time engine.
//! These define the boundaries between the clock and whatever drives time
//! forward, and between the clock and the code observing it.

mod error;
mod listener;
mod subticker;

pub use error::{ConfigError, ConfigResult};
pub use listener::{Granularity, ListenerToken, TickCallback, TickFuture, callback};
pub use subticker::{RunState, SubtickAction, Subticker};
