//! Advancement algorithm shared by every subticker
//!
//! A traversal walks the inclusive subtick range `start..=end`, updating
//! elapsed time at each boundary and running the scheduled action unless the
//! boundary is the terminal point of the previous completed advancement.
//!
//! Every command runs to completion on its own tokio task, so dropping the
//! caller's future never leaves a traversal half-applied. Commands issued
//! from inside the scheduled action are queued and applied once the command
//! that is running the action has finished.

use hadron_core::{Subticking, TickEvent, TimeQuantity};
use hadron_ports::{RunState, SubtickAction};
use parking_lot::{Mutex as SyncMutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(0);

tokio::task_local! {
    /// Timeline whose command is currently running on this task
    static RUNNING_TIMELINE: u64;
}

/// Mutable scheduling state owned by one subticker
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    elapsed: Subticking,
    /// Elapsed time at the end of the last completed advancement
    last_boundary: Option<Subticking>,
    state: RunState,
    /// Requests accepted while not running, replayed FIFO on resume
    pending: VecDeque<Subticking>,
    /// Set once the first boundary of the session has been executed
    session_started: bool,
    /// Bumped on every state transition; stale wall-clock pumps compare against it
    generation: u64,
}

impl Timeline {
    fn reset(&mut self) {
        self.elapsed = Subticking::ZERO;
        self.last_boundary = None;
        self.pending.clear();
        self.session_started = false;
    }

    fn status(&self) -> TimelineStatus {
        TimelineStatus {
            elapsed: self.elapsed,
            last_boundary: self.last_boundary,
            state: self.state,
            pending: self.pending.len(),
            generation: self.generation,
        }
    }
}

/// Read-only view of a [`Timeline`], published without holding its lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct TimelineStatus {
    pub(crate) elapsed: Subticking,
    pub(crate) last_boundary: Option<Subticking>,
    pub(crate) state: RunState,
    pub(crate) pending: usize,
    pub(crate) generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Resume,
    Pause,
    Stop,
    Advance(Subticking),
}

/// A [`Timeline`] behind the lock that serializes every command on it,
/// plus the action scheduled to run at each boundary.
///
/// `tokio::sync::Mutex` is fair, so concurrent callers are processed in the
/// order they queued. Queries read the published [`TimelineStatus`] and never
/// wait for a running command.
pub(crate) struct SharedTimeline {
    id: u64,
    name: String,
    timeline: Mutex<Timeline>,
    action: RwLock<Option<SubtickAction>>,
    status: watch::Sender<TimelineStatus>,
    /// Commands issued by the action while a command is running
    deferred: SyncMutex<VecDeque<Command>>,
}

impl SharedTimeline {
    pub(crate) fn new(name: impl Into<String>) -> Arc<Self> {
        let (status, _) = watch::channel(TimelineStatus::default());
        Arc::new(Self {
            id: NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            timeline: Mutex::new(Timeline::default()),
            action: RwLock::new(None),
            status,
            deferred: SyncMutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn schedule(&self, action: SubtickAction) {
        *self.action.write() = Some(action);
    }

    fn action(&self) -> Option<SubtickAction> {
        self.action.read().clone()
    }

    pub(crate) fn status(&self) -> TimelineStatus {
        *self.status.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<TimelineStatus> {
        self.status.subscribe()
    }

    fn publish(&self, timeline: &Timeline) {
        self.status.send_replace(timeline.status());
    }

    /// Whether the caller is the action of a command running on this timeline
    fn inside_action(&self) -> bool {
        RUNNING_TIMELINE
            .try_with(|id| *id == self.id)
            .unwrap_or(false)
    }

    /// Paused/Stopped -> Running, then replay buffered requests
    pub(crate) async fn resume(self: &Arc<Self>) {
        self.submit(Command::Resume).await;
    }

    pub(crate) async fn pause(self: &Arc<Self>) {
        self.submit(Command::Pause).await;
    }

    pub(crate) async fn stop(self: &Arc<Self>) {
        self.submit(Command::Stop).await;
    }

    pub(crate) async fn advance(self: &Arc<Self>, delta: Subticking) {
        if delta.is_zero() {
            return;
        }
        if delta < Subticking::ZERO {
            log::warn!("{}: ignoring negative advance by {}", self.name, delta);
            return;
        }
        self.submit(Command::Advance(delta)).await;
    }

    async fn submit(self: &Arc<Self>, command: Command) {
        if self.inside_action() {
            log::debug!("{}: deferring {:?} until the current command completes", self.name, command);
            self.deferred.lock().push_back(command);
            return;
        }

        let this = Arc::clone(self);
        let task = tokio::spawn(RUNNING_TIMELINE.scope(self.id, async move {
            let mut timeline = this.timeline.lock().await;
            this.apply(&mut timeline, command).await;
            this.apply_deferred(&mut timeline).await;
        }));

        if let Err(err) = task.await {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }

    /// Advance on behalf of a wall-clock pump started at `generation`.
    ///
    /// Never buffers: a step from a pump that predates the latest transition
    /// is dropped and `false` tells the pump to retire.
    pub(crate) async fn pump(&self, generation: u64, step: Subticking) -> bool {
        RUNNING_TIMELINE
            .scope(self.id, async {
                let mut timeline = self.timeline.lock().await;
                if timeline.generation != generation || timeline.state != RunState::Running {
                    return false;
                }

                let action = self.action();
                self.traverse(&mut timeline, step, action.as_ref()).await;
                self.apply_deferred(&mut timeline).await;
                true
            })
            .await
    }

    async fn apply_deferred(&self, timeline: &mut Timeline) {
        loop {
            let next = self.deferred.lock().pop_front();
            match next {
                Some(command) => self.apply(timeline, command).await,
                None => break,
            }
        }
    }

    async fn apply(&self, timeline: &mut Timeline, command: Command) {
        match command {
            Command::Resume => {
                if timeline.state == RunState::Running {
                    return;
                }

                log::info!(
                    "{}: {} -> running at {}",
                    self.name,
                    timeline.state,
                    timeline.elapsed
                );
                timeline.state = RunState::Running;
                timeline.generation += 1;
                self.publish(timeline);

                let action = self.action();
                while let Some(delta) = timeline.pending.pop_front() {
                    log::debug!("{}: replaying buffered advance by {}", self.name, delta);
                    self.traverse(timeline, delta, action.as_ref()).await;
                }
            }
            Command::Pause => {
                if timeline.state != RunState::Running {
                    return;
                }

                log::info!("{}: running -> paused at {}", self.name, timeline.elapsed);
                timeline.state = RunState::Paused;
                timeline.generation += 1;
            }
            Command::Stop => {
                log::info!(
                    "{}: {} -> stopped (dropping {} buffered requests)",
                    self.name,
                    timeline.state,
                    timeline.pending.len()
                );
                timeline.state = RunState::Stopped;
                timeline.generation += 1;
                timeline.reset();
            }
            Command::Advance(delta) => {
                if timeline.state != RunState::Running {
                    log::debug!(
                        "{}: {}, buffering advance by {}",
                        self.name,
                        timeline.state,
                        delta
                    );
                    timeline.pending.push_back(delta);
                } else {
                    log::debug!(
                        "{}: advancing {} by {}",
                        self.name,
                        timeline.elapsed,
                        delta
                    );
                    let action = self.action();
                    self.traverse(timeline, delta, action.as_ref()).await;
                }
            }
        }
        self.publish(timeline);
    }

    /// Walk `elapsed..=elapsed + delta`, invoking `action` at each executed boundary
    async fn traverse(
        &self,
        timeline: &mut Timeline,
        delta: Subticking,
        action: Option<&SubtickAction>,
    ) {
        let start = timeline.elapsed;
        let end = start + delta;

        for boundary in start.stride_to(end) {
            timeline.elapsed = boundary;
            self.publish(timeline);

            if boundary == start && timeline.last_boundary == Some(start) {
                continue;
            }

            let previous = if timeline.session_started {
                Some((boundary - Subticking::subticks(1)).max(Subticking::ZERO))
            } else {
                None
            };
            timeline.session_started = true;

            if let Some(action) = action {
                action(TickEvent {
                    start,
                    previous,
                    current: boundary,
                    end,
                })
                .await;
            }
        }

        assert_eq!(
            timeline.elapsed, end,
            "boundary traversal ended at {} instead of {}",
            timeline.elapsed, end
        );
        timeline.last_boundary = Some(timeline.elapsed);
        self.publish(timeline);
    }
}
