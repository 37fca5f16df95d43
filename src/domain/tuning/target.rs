use super::{non_negative_gain, positive};
use crate::domain::errors::ConfigError;

/// Spring-damper gains for the virtual pursuit target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTuning {
    /// Proportional gain pulling the target toward the reference point.
    pub kp: f64,

    /// Velocity damping gain.
    pub kd: f64,

    /// Speed cap in scene units per second.
    pub max_speed: f64,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            kp: 15.0,
            kd: 2.0,
            max_speed: 400.0,
        }
    }
}

impl TargetTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative_gain(self.kp, "kp")?;
        non_negative_gain(self.kd, "kd")?;
        positive(self.max_speed, "max_target_speed")
    }
}
