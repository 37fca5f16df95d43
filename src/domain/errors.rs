// Domain-level errors for policy calls and configuration checks.

use std::fmt;

/// Reasons a policy could not supply an action for a tick.
///
/// None of these are fatal: the arbiter substitutes the pursuit heuristic.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// No policy is configured or the backend is not ready.
    Unavailable,
    /// The call did not resolve within the tick budget.
    Timeout,
    /// The policy answered with something that is not two finite floats.
    Malformed(String),
    /// The inference backend reported a failure.
    Inference(String),
}

impl PolicyError {
    /// Short label for logs and wire snapshots.
    pub fn label(&self) -> &'static str {
        match self {
            PolicyError::Unavailable => "unavailable",
            PolicyError::Timeout => "timeout",
            PolicyError::Malformed(_) => "malformed",
            PolicyError::Inference(_) => "inference",
        }
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Unavailable => write!(f, "policy unavailable"),
            PolicyError::Timeout => write!(f, "policy timed out"),
            PolicyError::Malformed(detail) => write!(f, "malformed policy output: {detail}"),
            PolicyError::Inference(detail) => write!(f, "policy inference failed: {detail}"),
        }
    }
}

impl std::error::Error for PolicyError {}

/// Caller contract violations rejected before (or instead of) running a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidWheelbase,
    InvalidDrag,
    InvalidLimit(&'static str),
    InvalidGain(&'static str),
    InvalidTimestep,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWheelbase => write!(f, "wheelbase must be finite and > 0"),
            ConfigError::InvalidDrag => write!(f, "drag coefficient must be in (0, 1]"),
            ConfigError::InvalidLimit(name) => write!(f, "{name} must be finite and > 0"),
            ConfigError::InvalidGain(name) => write!(f, "{name} must be finite and >= 0"),
            ConfigError::InvalidTimestep => write!(f, "dt must be finite and >= 0"),
        }
    }
}

impl std::error::Error for ConfigError {}
