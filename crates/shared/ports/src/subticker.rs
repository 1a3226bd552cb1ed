use async_trait::async_trait;
use hadron_core::Subticking;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TickCallback;

/// Action a subticker runs at every subtick boundary it visits
pub type SubtickAction = TickCallback;

/// Lifecycle of a time source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Initial state; elapsed time is zero
    #[default]
    Stopped,
    /// Elapsed time frozen, advancement requests buffered
    Paused,
    /// Advancement requests applied immediately
    Running,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Stopped => write!(f, "stopped"),
            RunState::Paused => write!(f, "paused"),
            RunState::Running => write!(f, "running"),
        }
    }
}

/// Port for whatever drives simulated time forward
///
/// Implementations:
/// - Virtual: moves only when `advance` is called (deterministic tests,
///   non-interactive simulation)
/// - Real: additionally pumps itself forward from the wall clock
///
/// Both must produce identical action sequences for identical sequences of
/// `advance` calls. Every operation is total; none of them fail.
///
/// Operations run to completion even when the caller's future is dropped.
/// Operations issued from inside the scheduled action return immediately and
/// apply once the operation running that action has finished.
#[async_trait]
pub trait Subticker: Send + Sync {
    /// Set (replacing any previous) the action run once per subtick boundary.
    /// Does not itself trigger execution.
    fn schedule(&self, action: SubtickAction);

    /// Paused/Stopped -> Running, then replay buffered requests in FIFO order
    async fn resume(&self);

    /// Running -> Paused; later requests are buffered
    async fn pause(&self);

    /// Any -> Stopped; drops buffered requests, clears the last-boundary
    /// marker and resets elapsed time to zero. The scheduled action is kept.
    async fn stop(&self);

    /// Move time forward by `delta`, or buffer the request when not running
    async fn advance(&self, delta: Subticking);

    async fn elapsed_time(&self) -> Subticking;

    /// Elapsed time at the end of the last completed advancement
    async fn last_boundary_time(&self) -> Option<Subticking>;

    async fn state(&self) -> RunState;

    /// Number of buffered advancement requests
    async fn pending_count(&self) -> usize;

    /// Identifier for debugging
    fn name(&self) -> &str {
        "Subticker"
    }
}
