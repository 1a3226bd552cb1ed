//! Recording listeners
//!
//! Counts notifications and optionally keeps every boundary seen so a run
//! can be dumped as JSON lines afterwards.

use hadron_core::TickEvent;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, RunnerError};

#[derive(Debug, Default)]
pub struct EventRecorder {
    ticks: AtomicU64,
    subticks: AtomicU64,
    events: Option<Mutex<Vec<TickEvent>>>,
}

impl EventRecorder {
    /// Counting-only recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that also keeps every boundary in notification order
    pub fn keeping_events() -> Self {
        Self {
            events: Some(Mutex::new(Vec::new())),
            ..Self::default()
        }
    }

    /// Tick listener body
    pub fn on_tick(&self, event: TickEvent) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.keep(event);
    }

    /// Subtick listener body. Whole ticks are already kept by `on_tick`.
    pub fn on_subtick(&self, event: TickEvent) {
        self.subticks.fetch_add(1, Ordering::Relaxed);
        if !event.is_tick() {
            self.keep(event);
        }
    }

    fn keep(&self, event: TickEvent) {
        if let Some(events) = &self.events {
            events.lock().push(event);
        }
    }

    pub fn ticks_notified(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn subticks_notified(&self) -> u64 {
        self.subticks.load(Ordering::Relaxed)
    }

    /// Snapshot of kept events (empty for counting-only recorders)
    pub fn events(&self) -> Vec<TickEvent> {
        self.events
            .as_ref()
            .map(|events| events.lock().clone())
            .unwrap_or_default()
    }

    /// Write kept events to `path`, one JSON object per line
    pub async fn write_json_lines(&self, path: impl AsRef<Path>) -> Result<usize> {
        let events = self.events();
        let mut out = String::new();
        for event in &events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }

        let path = path.as_ref();
        tokio::fs::write(path, out)
            .await
            .map_err(|source| RunnerError::Io {
                path: path.display().to_string(),
                source,
            })?;

        log::info!("Recorded {} events to {}", events.len(), path.display());
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hadron_core::{Subticking, TimeQuantity};

    fn at(current: Subticking) -> TickEvent {
        TickEvent {
            start: Subticking::ZERO,
            previous: None,
            current,
            end: Subticking::ticks(1),
        }
    }

    #[test]
    fn test_counting_only_keeps_nothing() {
        let recorder = EventRecorder::new();
        recorder.on_tick(at(Subticking::ticks(0)));
        recorder.on_subtick(at(Subticking::subticks(1)));

        assert_eq!(recorder.ticks_notified(), 1);
        assert_eq!(recorder.subticks_notified(), 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_whole_ticks_kept_once() {
        let recorder = EventRecorder::keeping_events();
        recorder.on_tick(at(Subticking::ticks(1)));
        recorder.on_subtick(at(Subticking::ticks(1)));
        recorder.on_subtick(at(Subticking::subticks(1001)));

        let currents: Vec<_> = recorder.events().iter().map(|e| e.current).collect();
        assert_eq!(
            currents,
            vec![Subticking::ticks(1), Subticking::subticks(1001)]
        );
        assert_eq!(recorder.subticks_notified(), 2);
    }
}
