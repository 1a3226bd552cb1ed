//! Simulation - drives a clock for a fixed span of simulated time
//!
//! Virtual mode issues `advance_time` requests of `step` ticks until
//! `ticks` have elapsed. Real mode starts the wall-clock pump and waits
//! until elapsed time reaches `ticks`, then pauses.

use chrono::{DateTime, Utc};
use hadron_clock::{Clock, Subticker};
use hadron_core::Subticking;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

use crate::config::{RunnerConfig, SimulationMode};
use crate::error::Result;
use crate::recorder::EventRecorder;

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub mode: SimulationMode,
    /// Whole-tick notifications delivered
    pub ticks_notified: u64,
    /// Subtick notifications delivered (zero unless subtick listeners are on)
    pub subticks_notified: u64,
    /// Elapsed simulated time once the run stopped
    pub final_elapsed: Subticking,
    /// Events written to `record_path`, if recording
    pub events_recorded: Option<usize>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct SimulationRunner {
    config: RunnerConfig,
    recorder: Arc<EventRecorder>,
}

impl SimulationRunner {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.validate()?;

        let recorder = if config.record_path.is_some() {
            EventRecorder::keeping_events()
        } else {
            EventRecorder::new()
        };

        Ok(Self {
            config,
            recorder: Arc::new(recorder),
        })
    }

    /// Run to completion
    pub async fn run(&self) -> Result<SimulationReport> {
        let started_at = Utc::now();
        log::info!(
            "Starting {} simulation for {} ticks",
            self.config.mode,
            self.config.ticks
        );

        let final_elapsed = match self.config.mode {
            SimulationMode::Virtual => {
                let clock = Clock::virtual_time();
                self.attach(&clock);
                self.run_virtual(&clock).await
            }
            SimulationMode::Real => {
                let clock = Clock::real_time(self.config.real_time)?;
                self.attach(&clock);
                self.run_real(&clock).await
            }
        };

        let events_recorded = match &self.config.record_path {
            Some(path) => Some(self.recorder.write_json_lines(path).await?),
            None => None,
        };

        let report = SimulationReport {
            mode: self.config.mode,
            ticks_notified: self.recorder.ticks_notified(),
            subticks_notified: self.recorder.subticks_notified(),
            final_elapsed,
            events_recorded,
            started_at,
            finished_at: Utc::now(),
        };

        log::info!(
            "Simulation finished at {} ({} ticks, {} subticks notified)",
            report.final_elapsed,
            report.ticks_notified,
            report.subticks_notified
        );
        Ok(report)
    }

    fn attach<S: Subticker>(&self, clock: &Clock<S>) {
        let recorder = Arc::clone(&self.recorder);
        clock.add_listener(move |event| {
            let recorder = Arc::clone(&recorder);
            async move { recorder.on_tick(event) }
        });

        if self.config.subtick_listeners {
            let recorder = Arc::clone(&self.recorder);
            clock.add_subtick_listener(move |event| {
                let recorder = Arc::clone(&recorder);
                async move { recorder.on_subtick(event) }
            });
        }
    }

    async fn run_virtual<S: Subticker>(&self, clock: &Clock<S>) -> Subticking {
        clock.start().await;

        let mut remaining = self.config.ticks;
        while remaining > 0 {
            let step = self.config.step.min(remaining);
            clock.advance_time(Subticking::ticks(step)).await;
            remaining -= step;
        }

        clock.pause().await;
        clock.elapsed_time().await
    }

    async fn run_real<S: Subticker>(&self, clock: &Clock<S>) -> Subticking {
        let target = Subticking::ticks(self.config.ticks);
        let mut poll = tokio::time::interval(self.config.real_time.period.to_std());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        clock.start().await;
        loop {
            poll.tick().await;
            let elapsed = clock.elapsed_time().await;
            if elapsed >= target {
                break;
            }
            log::trace!("Waiting for {target}, at {elapsed}");
        }

        clock.pause().await;
        clock.elapsed_time().await
    }
}
