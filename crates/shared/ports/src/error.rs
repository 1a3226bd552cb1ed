use thiserror::Error;

/// Rejected subticker or driver configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Pump period must be positive, got {0}")]
    NonPositivePeriod(String),

    #[error("Pump step must be positive, got {0}")]
    NonPositiveStep(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
