//! Error types for circadian light schedules

use thiserror::Error;

/// Errors raised when a light schedule contract is violated.
///
/// Every variant is raised synchronously at the point of the violation;
/// nothing is retried and no partially built schedule is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("`light` should be a nonnegative number, or a function of one real argument returning a nonnegative number: {0}")]
    InvalidFunction(String),

    #[error("`start` should be a finite real number, got {0}")]
    InvalidStart(f64),

    #[error("`duration` should be a nonnegative finite real number, got {0}")]
    InvalidDuration(f64),

    #[error("`default_value` should be a nonnegative finite real number, got {0}")]
    InvalidDefault(f64),

    #[error("light function returned {value} at t = {at}, expected a nonnegative value")]
    NegativeOutput { at: f64, value: f64 },

    #[error("`t` should be a real number or a sequence of real numbers: {0}")]
    InvalidTime(String),

    #[error("`repeat_period` should be a nonnegative real number, got {0}")]
    InvalidRepeatPeriod(f64),

    #[error("{name} {reason}, got {value}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
        value: f64,
    },

    #[error("Conflicting parameters: {0}")]
    ConflictingParameters(String),
}

impl DomainError {
    pub(crate) fn nonnegative(name: &'static str, value: f64) -> Self {
        DomainError::InvalidParameter {
            name,
            reason: "must be a nonnegative finite number",
            value,
        }
    }

    pub(crate) fn non_finite(name: &'static str, value: f64) -> Self {
        DomainError::InvalidParameter {
            name,
            reason: "must be a finite number",
            value,
        }
    }
}

/// Errors raised while loading a protocol configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
