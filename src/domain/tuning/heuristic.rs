/// Gains and output bounds for the pure pursuit fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicTuning {
    /// Steering command per radian of bearing error.
    pub steer_gain: f64,

    /// Symmetric bound on the steering command in radians.
    pub steer_limit: f64,

    /// Acceleration command per scene unit of distance.
    pub accel_gain: f64,

    pub accel_min: f64,
    pub accel_max: f64,
}

impl Default for HeuristicTuning {
    fn default() -> Self {
        Self {
            steer_gain: 2.0,
            steer_limit: 0.6,
            accel_gain: 2.0,
            accel_min: -100.0,
            accel_max: 300.0,
        }
    }
}
