//! Hadron Runner - non-interactive driver for the time engine
//!
//! - **Config**: JSON file plus `HADRON_*` environment overrides
//! - **Recorder**: counting listeners with optional JSON-lines capture
//! - **Simulation**: runs a virtual or real clock for a fixed number of ticks
//!
//! ```text
//!  RunnerConfig ──► SimulationRunner ──► Clock<VirtualSubticker | RealSubticker>
//!                          │                        │ tick / subtick events
//!                          ▼                        ▼
//!                  SimulationReport ◄──────── EventRecorder ──► events.jsonl
//! ```

pub mod config;
pub mod error;
pub mod recorder;
pub mod simulation;

pub use config::{RunnerConfig, SimulationMode};
pub use error::{Result, RunnerError};
pub use recorder::EventRecorder;
pub use simulation::{SimulationReport, SimulationRunner};
