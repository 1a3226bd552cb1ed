use async_trait::async_trait;
use hadron_core::Subticking;
use hadron_ports::{RunState, SubtickAction, Subticker};
use std::sync::Arc;

use crate::timeline::SharedTimeline;

/// Subticker that only moves when [`Subticker::advance`] is called
///
/// No wall-clock dependency: identical call sequences always produce
/// identical action sequences. Used for deterministic tests and for
/// non-interactive simulation.
pub struct VirtualSubticker {
    timeline: Arc<SharedTimeline>,
}

impl VirtualSubticker {
    pub fn new() -> Self {
        Self::named("VirtualSubticker")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            timeline: SharedTimeline::new(name),
        }
    }
}

impl Default for VirtualSubticker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subticker for VirtualSubticker {
    fn schedule(&self, action: SubtickAction) {
        self.timeline.schedule(action);
    }

    async fn resume(&self) {
        self.timeline.resume().await;
    }

    async fn pause(&self) {
        self.timeline.pause().await;
    }

    async fn stop(&self) {
        self.timeline.stop().await;
    }

    async fn advance(&self, delta: Subticking) {
        self.timeline.advance(delta).await;
    }

    async fn elapsed_time(&self) -> Subticking {
        self.timeline.status().elapsed
    }

    async fn last_boundary_time(&self) -> Option<Subticking> {
        self.timeline.status().last_boundary
    }

    async fn state(&self) -> RunState {
        self.timeline.status().state
    }

    async fn pending_count(&self) -> usize {
        self.timeline.status().pending
    }

    fn name(&self) -> &str {
        self.timeline.name()
    }
}
