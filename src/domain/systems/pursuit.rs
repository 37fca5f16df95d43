use crate::domain::angle::wrap_angle;
use crate::domain::state::{Action, TargetState, VehicleState};
use crate::domain::tuning::HeuristicTuning;

/// Deterministic pure-pursuit fallback: steer toward the target bearing, throttle by distance.
///
/// Always yields a command within the tuning bounds for finite states.
pub fn pure_pursuit(
    vehicle: &VehicleState,
    target: &TargetState,
    tuning: &HeuristicTuning,
) -> Action {
    let dx = target.x - vehicle.x;
    let dy = target.y - vehicle.y;
    let dist = dx.hypot(dy);
    let bearing = dy.atan2(dx);
    let angle_error = wrap_angle(bearing - vehicle.yaw);

    Action {
        steer: (angle_error * tuning.steer_gain).clamp(-tuning.steer_limit, tuning.steer_limit),
        accel: (dist * tuning.accel_gain).clamp(tuning.accel_min, tuning.accel_max),
    }
}
