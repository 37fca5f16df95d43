use super::positive;
use crate::domain::errors::ConfigError;

/// Vehicle limits for the kinematic bicycle model.
///
/// Immutable for a session; different hosts may pass different values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Steering angle limit in radians (symmetric).
    pub max_steer_angle: f64,

    /// Forward acceleration limit in scene units per second squared.
    pub max_acceleration: f64,

    /// Braking limit; larger than `max_acceleration` so the car can stop quickly.
    pub max_deceleration: f64,

    /// Multiplicative speed decay applied once per tick, in (0, 1].
    pub drag_coefficient: f64,

    /// Distance between axles in scene units.
    pub wheelbase: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            max_steer_angle: 0.6,
            max_acceleration: 500.0,
            max_deceleration: 600.0,
            drag_coefficient: 0.995,
            wheelbase: 48.0,
        }
    }
}

impl ControlParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.wheelbase.is_finite() && self.wheelbase > 0.0) {
            return Err(ConfigError::InvalidWheelbase);
        }
        if !(self.drag_coefficient > 0.0 && self.drag_coefficient <= 1.0) {
            return Err(ConfigError::InvalidDrag);
        }
        positive(self.max_steer_angle, "max_steer_angle")?;
        positive(self.max_acceleration, "max_acceleration")?;
        positive(self.max_deceleration, "max_deceleration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_defaults_are_used_then_validation_passes() {
        assert_eq!(ControlParams::default().validate(), Ok(()));
    }

    #[test]
    fn when_wheelbase_is_zero_then_validation_fails() {
        let params = ControlParams {
            wheelbase: 0.0,
            ..Default::default()
        };

        assert_eq!(params.validate(), Err(ConfigError::InvalidWheelbase));
    }

    #[test]
    fn when_drag_is_degenerate_then_validation_fails() {
        for drag in [0.0, -0.5, 1.01, f64::NAN] {
            let params = ControlParams {
                drag_coefficient: drag,
                ..Default::default()
            };
            assert_eq!(params.validate(), Err(ConfigError::InvalidDrag), "drag {drag}");
        }
    }

    #[test]
    fn when_a_limit_is_negative_then_validation_names_it() {
        let params = ControlParams {
            max_deceleration: -1.0,
            ..Default::default()
        };

        assert_eq!(
            params.validate(),
            Err(ConfigError::InvalidLimit("max_deceleration"))
        );
    }
}
