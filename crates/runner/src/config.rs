//! Configuration loading for the simulation runner
//!
//! Supports a JSON configuration file plus environment overrides:
//! - `HADRON_MODE`  - `virtual` or `real`
//! - `HADRON_TICKS` - ticks to simulate
//! - `HADRON_STEP`  - ticks per advancement request (virtual mode)

use hadron_clock::RealSubtickerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, RunnerError};

/// Which subticker drives the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Time moves only on explicit requests; runs as fast as listeners allow
    #[default]
    Virtual,
    /// Time moves with the wall clock
    Real,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::Virtual => write!(f, "virtual"),
            SimulationMode::Real => write!(f, "real"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "virtual" => Ok(SimulationMode::Virtual),
            "real" => Ok(SimulationMode::Real),
            other => Err(RunnerError::InvalidConfig(format!(
                "unknown mode '{other}' (expected 'virtual' or 'real')"
            ))),
        }
    }
}

/// Root configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub mode: SimulationMode,

    /// Ticks of simulated time to cover
    #[serde(default = "default_ticks")]
    pub ticks: i64,

    /// Ticks per `advance_time` request in virtual mode
    #[serde(default = "default_step")]
    pub step: i64,

    /// Also observe every subtick boundary
    #[serde(default)]
    pub subtick_listeners: bool,

    /// Pump pacing in real mode
    #[serde(default)]
    pub real_time: RealSubtickerConfig,

    /// Write every recorded notification here as JSON lines
    #[serde(default)]
    pub record_path: Option<PathBuf>,
}

fn default_ticks() -> i64 {
    100
}

fn default_step() -> i64 {
    1
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: SimulationMode::default(),
            ticks: default_ticks(),
            step: default_step(),
            subtick_listeners: false,
            real_time: RealSubtickerConfig::default(),
            record_path: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| RunnerError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `HADRON_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `HADRON_*` overrides from an arbitrary lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(mode) = lookup("HADRON_MODE") {
            self.mode = mode.parse()?;
        }
        if let Some(ticks) = lookup("HADRON_TICKS") {
            self.ticks = parse_count("HADRON_TICKS", &ticks)?;
        }
        if let Some(step) = lookup("HADRON_STEP") {
            self.step = parse_count("HADRON_STEP", &step)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticks <= 0 {
            return Err(RunnerError::InvalidConfig(format!(
                "ticks must be positive, got {}",
                self.ticks
            )));
        }
        if self.step <= 0 {
            return Err(RunnerError::InvalidConfig(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        self.real_time.validate()?;
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|e| RunnerError::InvalidConfig(format!("{key}={value}: {e}")))
}
