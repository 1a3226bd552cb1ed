use hadron_core::{Subticking, TickEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Future returned by a tick callback
pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A callback receiving `(start, previous, current, end)` as a [`TickEvent`]
///
/// Shared by listeners and by the per-subtick action a subticker runs.
pub type TickCallback = Arc<dyn Fn(TickEvent) -> TickFuture + Send + Sync>;

/// Wrap an async closure into a [`TickCallback`]
pub fn callback<F, Fut>(f: F) -> TickCallback
where
    F: Fn(TickEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |event| Box::pin(f(event)) as TickFuture)
}

/// Opaque handle issued when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerToken(Uuid);

impl ListenerToken {
    /// Issue a fresh, never-before-seen token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ListenerToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Which boundaries a listener wants to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    /// Only boundaries that land on a whole tick
    #[default]
    Tick,
    /// Every subtick boundary
    Subtick,
}

impl Granularity {
    /// Gate applied to a boundary before a listener is invoked
    pub fn admits(&self, boundary: Subticking) -> bool {
        match self {
            Granularity::Tick => boundary.is_whole_tick(),
            Granularity::Subtick => true,
        }
    }
}
