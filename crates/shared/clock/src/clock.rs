use hadron_core::{Subticking, TickEvent};
use hadron_ports::{
    ConfigResult, Granularity, ListenerToken, RunState, Subticker, TickCallback, callback,
};
use std::future::Future;
use std::sync::Arc;

use crate::{ListenerRegistry, RealSubticker, RealSubtickerConfig, VirtualSubticker};

/// Orchestrator of simulated time
///
/// Owns the listener registry and delegates raw subtick progression to a
/// [`Subticker`]. The subticker runs one action per subtick boundary; the
/// clock's action fans that boundary out to listeners, gated by each
/// listener's [`Granularity`].
///
/// ```text
///  advance_time(Δ) ──► Subticker ──(every subtick)──► ListenerRegistry
///                        │                               │
///                        └── pending FIFO while paused   ├── Tick listeners    (whole ticks)
///                                                        └── Subtick listeners (every boundary)
/// ```
///
/// All operations are serialized by the subticker; share a clock between
/// tasks with `Arc<Clock<_>>`. Queries never wait for a running advancement.
/// Transitions and `advance_time` calls made by a listener of the same clock
/// return immediately and apply once the advancement notifying it finishes.
pub struct Clock<S: Subticker = VirtualSubticker> {
    subticker: S,
    listeners: Arc<ListenerRegistry>,
}

impl Clock<VirtualSubticker> {
    /// Clock that only moves on explicit `advance_time` calls
    pub fn virtual_time() -> Self {
        Self::new(VirtualSubticker::new())
    }
}

impl Clock<RealSubticker> {
    /// Clock driven by the wall clock while running
    pub fn real_time(config: RealSubtickerConfig) -> ConfigResult<Self> {
        Ok(Self::new(RealSubticker::new(config)?))
    }
}

impl Default for Clock<VirtualSubticker> {
    fn default() -> Self {
        Self::virtual_time()
    }
}

impl<S: Subticker> Clock<S> {
    /// Wrap `subticker`, replacing whatever action it had scheduled
    pub fn new(subticker: S) -> Self {
        let listeners = Arc::new(ListenerRegistry::new());

        let registry = Arc::clone(&listeners);
        subticker.schedule(callback(move |event| {
            let registry = Arc::clone(&registry);
            async move { registry.notify_all(event).await }
        }));

        Self {
            subticker,
            listeners,
        }
    }

    /// Begin the passage of time (Stopped starts from zero)
    pub async fn start(&self) {
        self.subticker.resume().await;
    }

    /// Continue from the frozen elapsed time, replaying buffered requests
    pub async fn resume(&self) {
        self.subticker.resume().await;
    }

    /// Freeze elapsed time; later requests are buffered, not dropped
    pub async fn pause(&self) {
        self.subticker.pause().await;
    }

    /// Return to the initial timing state, keeping listeners
    pub async fn stop(&self) {
        self.subticker.stop().await;
    }

    /// Return to the initial state and drop every listener
    pub async fn reset(&self) {
        self.subticker.stop().await;
        self.listeners.clear();
        log::info!("{}: reset", self.subticker.name());
    }

    /// Request progression by `delta`.
    ///
    /// Returns once every listener for every boundary in the range has
    /// completed, or immediately when the request was buffered. Dropping the
    /// returned future does not cancel the advancement.
    pub async fn advance_time(&self, delta: impl Into<Subticking>) {
        self.subticker.advance(delta.into()).await;
    }

    /// Register an async listener notified at every whole tick
    pub fn add_listener<F, Fut>(&self, f: F) -> ListenerToken
    where
        F: Fn(TickEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.listeners.add(Granularity::Tick, callback(f))
    }

    /// Register an async listener notified at every subtick boundary
    pub fn add_subtick_listener<F, Fut>(&self, f: F) -> ListenerToken
    where
        F: Fn(TickEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.listeners.add(Granularity::Subtick, callback(f))
    }

    /// Register a pre-built callback with an explicit granularity
    pub fn add_callback(&self, granularity: Granularity, callback: TickCallback) -> ListenerToken {
        self.listeners.add(granularity, callback)
    }

    /// Unregister a listener; unknown tokens are ignored
    pub fn remove_listener(&self, token: ListenerToken) -> bool {
        self.listeners.remove(token)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current simulated time
    pub async fn elapsed_time(&self) -> Subticking {
        self.subticker.elapsed_time().await
    }

    pub async fn last_boundary_time(&self) -> Option<Subticking> {
        self.subticker.last_boundary_time().await
    }

    pub async fn state(&self) -> RunState {
        self.subticker.state().await
    }

    pub async fn is_running(&self) -> bool {
        self.state().await == RunState::Running
    }

    /// Advancement requests waiting for `resume`
    pub async fn pending_count(&self) -> usize {
        self.subticker.pending_count().await
    }

    pub fn subticker(&self) -> &S {
        &self.subticker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hadron_core::TimeQuantity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(clock: &Clock, count: &Arc<AtomicUsize>) -> ListenerToken {
        let count = Arc::clone(count);
        clock.add_listener(move |_event| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn test_two_ticks_notify_three_boundaries() {
        let clock = Clock::virtual_time();
        clock.start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let token = counting(&clock, &calls);

        clock.advance_time(Subticking::ticks(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        clock.remove_listener(token);
        clock.advance_time(Subticking::ticks(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.elapsed_time().await, Subticking::ticks(4));
    }

    #[tokio::test]
    async fn test_back_to_back_advances_match_single_advance() {
        let split = Clock::virtual_time();
        let single = Clock::virtual_time();
        let split_calls = Arc::new(AtomicUsize::new(0));
        let single_calls = Arc::new(AtomicUsize::new(0));
        counting(&split, &split_calls);
        counting(&single, &single_calls);
        split.start().await;
        single.start().await;

        split.advance_time(Subticking::ticks(2)).await;
        split.advance_time(Subticking::ticks(2)).await;
        single.advance_time(Subticking::ticks(4)).await;

        assert_eq!(split_calls.load(Ordering::SeqCst), 5);
        assert_eq!(single_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_subtick_listener_sees_every_boundary() {
        let clock = Clock::virtual_time();
        let subticks = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&subticks);
        clock.add_subtick_listener(move |_event| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        clock.start().await;
        clock.advance_time(Subticking::subticks(1500)).await;
        assert_eq!(subticks.load(Ordering::SeqCst), 1501);
    }

    #[tokio::test]
    async fn test_accepts_wall_durations() {
        let clock = Clock::virtual_time();
        clock.start().await;
        clock.advance_time(hadron_core::Duration::milliseconds(3)).await;
        assert_eq!(clock.elapsed_time().await, Subticking::ticks(3));
    }

    #[tokio::test]
    async fn test_reset_drops_listeners_stop_keeps_them() {
        let clock = Clock::virtual_time();
        let calls = Arc::new(AtomicUsize::new(0));
        counting(&clock, &calls);

        clock.stop().await;
        assert_eq!(clock.listener_count(), 1);

        clock.reset().await;
        assert_eq!(clock.listener_count(), 0);
        assert_eq!(clock.state().await, RunState::Stopped);
        assert_eq!(clock.elapsed_time().await, Subticking::ZERO);
    }

    #[tokio::test]
    async fn test_start_while_running_is_noop() {
        let clock = Clock::virtual_time();
        clock.start().await;
        clock.advance_time(Subticking::ticks(1)).await;
        clock.start().await;

        assert!(clock.is_running().await);
        assert_eq!(clock.elapsed_time().await, Subticking::ticks(1));
    }

    #[tokio::test]
    async fn test_listener_can_query_and_pause_its_clock() {
        let clock = Arc::new(Clock::virtual_time());
        let reads = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let handle = Arc::downgrade(&clock);
        let sink = Arc::clone(&reads);
        clock.add_listener(move |event| {
            let handle = handle.clone();
            let sink = Arc::clone(&sink);
            async move {
                let Some(clock) = handle.upgrade() else {
                    return;
                };
                let elapsed = clock.elapsed_time().await;
                let state = clock.state().await;
                sink.lock().push((elapsed, state));
                if event.current == Subticking::ticks(1) {
                    clock.pause().await;
                }
            }
        });

        clock.start().await;
        let finished = tokio::time::timeout(
            tokio::time::Duration::from_secs(2),
            clock.advance_time(Subticking::ticks(2)),
        )
        .await;
        assert!(finished.is_ok());

        let reads = reads.lock().clone();
        assert_eq!(
            reads,
            vec![
                (Subticking::ticks(0), RunState::Running),
                (Subticking::ticks(1), RunState::Running),
                (Subticking::ticks(2), RunState::Running),
            ]
        );
        assert_eq!(clock.state().await, RunState::Paused);

        clock.advance_time(Subticking::ticks(1)).await;
        assert_eq!(clock.pending_count().await, 1);
        assert_eq!(clock.elapsed_time().await, Subticking::ticks(2));
    }

    #[tokio::test]
    async fn test_listener_advance_applies_after_current_round() {
        let clock = Arc::new(Clock::virtual_time());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let handle = Arc::downgrade(&clock);
        let sink = Arc::clone(&seen);
        clock.add_listener(move |event| {
            let handle = handle.clone();
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push(event.current);
                if event.current == Subticking::ticks(1) {
                    if let Some(clock) = handle.upgrade() {
                        clock.advance_time(Subticking::ticks(2)).await;
                    }
                }
            }
        });

        clock.start().await;
        clock.advance_time(Subticking::ticks(1)).await;

        assert_eq!(
            *seen.lock(),
            vec![Subticking::ticks(0), Subticking::ticks(1), Subticking::ticks(2), Subticking::ticks(3)]
        );
        assert_eq!(clock.elapsed_time().await, Subticking::ticks(3));
    }
}
