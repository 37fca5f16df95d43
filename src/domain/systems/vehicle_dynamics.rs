use crate::domain::angle::wrap_angle;
use crate::domain::state::VehicleState;
use crate::domain::tuning::ControlParams;

/// Commands as actually applied after clamping to the vehicle limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedCommand {
    pub delta: f64,
    pub accel: f64,
}

/// Integrates the kinematic bicycle model one explicit Euler step.
///
/// `dt` must be finite and non-negative, and `params` must have passed validation;
/// neither is re-checked here.
pub fn step(
    vehicle: &mut VehicleState,
    steer_cmd: f64,
    accel_cmd: f64,
    dt: f64,
    params: &ControlParams,
) -> AppliedCommand {
    let delta = steer_cmd.clamp(-params.max_steer_angle, params.max_steer_angle);
    let accel = accel_cmd.clamp(-params.max_deceleration, params.max_acceleration);
    vehicle.delta = delta;

    // Position uses heading and speed from before this step.
    let (sin_yaw, cos_yaw) = vehicle.yaw.sin_cos();
    vehicle.x += vehicle.v * cos_yaw * dt;
    vehicle.y += vehicle.v * sin_yaw * dt;

    vehicle.yaw += (vehicle.v / vehicle.wheelbase) * delta.tan() * dt;
    vehicle.yaw = wrap_angle(vehicle.yaw);

    // Drag applies every tick, even with zero throttle.
    vehicle.v += accel * dt;
    vehicle.v *= params.drag_coefficient;

    AppliedCommand { delta, accel }
}
