// Physics and controller tuning, kept apart from runtime/server configuration.

pub mod arena;
pub mod heuristic;
pub mod target;
pub mod vehicle;

pub use arena::ArenaTuning;
pub use heuristic::HeuristicTuning;
pub use target::TargetTuning;
pub use vehicle::ControlParams;

use crate::domain::errors::ConfigError;

fn positive(value: f64, name: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLimit(name))
    }
}

fn non_negative_gain(value: f64, name: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidGain(name))
    }
}
