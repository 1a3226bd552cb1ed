use async_trait::async_trait;
use hadron_core::{Duration, Subticking, TimeQuantity};
use hadron_ports::{ConfigError, ConfigResult, RunState, SubtickAction, Subticker};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::timeline::SharedTimeline;

/// Wall-clock pacing for a [`RealSubticker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealSubtickerConfig {
    /// Wall time between two pump steps
    #[serde(default = "default_period")]
    pub period: Duration,
    /// Simulated time applied per pump step
    #[serde(default = "default_step")]
    pub step: Subticking,
}

fn default_period() -> Duration {
    Duration::milliseconds(1)
}

fn default_step() -> Subticking {
    Subticking::subticks(1)
}

impl Default for RealSubtickerConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            step: default_step(),
        }
    }
}

impl RealSubtickerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.period <= Duration::ZERO {
            return Err(ConfigError::NonPositivePeriod(self.period.to_string()));
        }
        if self.step <= Subticking::ZERO {
            return Err(ConfigError::NonPositiveStep(self.step.to_string()));
        }
        Ok(())
    }
}

/// Subticker that pumps itself forward from the wall clock while running
///
/// By default one subtick per wall millisecond. Explicit `advance` calls are
/// applied exactly as the virtual subticker applies them; pump steps go
/// through the same traversal, serialized with everything else.
pub struct RealSubticker {
    config: RealSubtickerConfig,
    timeline: Arc<SharedTimeline>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl RealSubticker {
    pub fn new(config: RealSubtickerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            timeline: SharedTimeline::new("RealSubticker"),
            pump: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RealSubtickerConfig {
        &self.config
    }

    /// Whether the wall clock is currently moving time forward
    pub fn is_pumping(&self) -> bool {
        self.timeline.status().state == RunState::Running
            && self
                .pump
                .lock()
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Attach the pump task on first use.
    ///
    /// The pump idles while the timeline is not running. Each transition to
    /// Running starts a fresh interval bound to that generation; steps from
    /// an older generation are refused, so nothing is applied or buffered
    /// after a pause or stop, including one requested by a listener.
    fn ensure_pump(&self) {
        let mut slot = self.pump.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let timeline = Arc::clone(&self.timeline);
        let mut status = timeline.subscribe();
        let period = self.config.period.to_std();
        let step = self.config.step;

        *slot = Some(tokio::spawn(async move {
            loop {
                let generation = loop {
                    let current = *status.borrow_and_update();
                    if current.state == RunState::Running {
                        break current.generation;
                    }
                    if status.changed().await.is_err() {
                        return;
                    }
                };

                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // First tick completes immediately
                interval.tick().await;

                loop {
                    interval.tick().await;
                    if !timeline.pump(generation, step).await {
                        break;
                    }
                }
                log::debug!("{}: pump generation {} retired", timeline.name(), generation);
            }
        }));
    }
}

impl Drop for RealSubticker {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.get_mut().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl Subticker for RealSubticker {
    fn schedule(&self, action: SubtickAction) {
        self.timeline.schedule(action);
    }

    async fn resume(&self) {
        self.timeline.resume().await;
        self.ensure_pump();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_one_subtick_per_millisecond() {
        let config = RealSubtickerConfig::default();
        assert_eq!(config.period, Duration::milliseconds(1));
        assert_eq!(config.step, Subticking::subticks(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_period = RealSubtickerConfig {
            period: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            RealSubticker::new(zero_period),
            Err(ConfigError::NonPositivePeriod(_))
        ));

        let negative_step = RealSubtickerConfig {
            step: Subticking::subticks(-1),
            ..Default::default()
        };
        assert!(matches!(
            negative_step.validate(),
            Err(ConfigError::NonPositiveStep(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_advances_while_running() {
        let subticker = RealSubticker::new(RealSubtickerConfig::default()).unwrap();
        subticker.resume().await;
        assert!(subticker.is_pumping());

        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        let elapsed = subticker.elapsed_time().await;
        assert!(elapsed > Subticking::ZERO);
        assert!(elapsed <= Subticking::subticks(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_pump_without_buffering() {
        let subticker = RealSubticker::new(RealSubtickerConfig::default()).unwrap();
        subticker.resume().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;

        subticker.pause().await;
        let frozen = subticker.elapsed_time().await;

        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        assert_eq!(subticker.elapsed_time().await, frozen);
        assert_eq!(subticker.pending_count().await, 0);
        assert!(!subticker.is_pumping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_resets_and_halts_pump() {
        let subticker = RealSubticker::new(RealSubtickerConfig::default()).unwrap();
        subticker.resume().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;

        subticker.stop().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        assert_eq!(subticker.state().await, RunState::Stopped);
        assert_eq!(subticker.elapsed_time().await, Subticking::ZERO);
        assert_eq!(subticker.last_boundary_time().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_step_size() {
        let config = RealSubtickerConfig {
            period: Duration::milliseconds(1),
            step: Subticking::ticks(1),
        };
        let subticker = RealSubticker::new(config).unwrap();
        subticker.resume().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let elapsed = subticker.elapsed_time().await;
        assert!(elapsed.is_whole_tick());
        assert!(elapsed >= Subticking::ticks(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_from_action_halts_pump() {
        let subticker = Arc::new(RealSubticker::new(RealSubtickerConfig::default()).unwrap());
        let handle = Arc::downgrade(&subticker);
        subticker.schedule(hadron_ports::callback(move |event| {
            let handle = handle.clone();
            async move {
                if event.current == Subticking::subticks(3) {
                    if let Some(subticker) = handle.upgrade() {
                        subticker.pause().await;
                    }
                }
            }
        }));

        subticker.resume().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert_eq!(subticker.state().await, RunState::Paused);
        assert_eq!(subticker.elapsed_time().await, Subticking::subticks(3));
        assert_eq!(subticker.pending_count().await, 0);
        assert!(!subticker.is_pumping());

        subticker.resume().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        assert!(subticker.elapsed_time().await > Subticking::subticks(3));
    }
}
