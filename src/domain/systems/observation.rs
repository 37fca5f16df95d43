use crate::domain::state::{Observation, TargetState, VehicleState};

/// Rotates a world-frame vector into the body frame of a vehicle heading `yaw`
/// (x forward, y to the vehicle's left).
pub fn world_to_body(dx: f64, dy: f64, yaw: f64) -> (f64, f64) {
    let (s, c) = yaw.sin_cos();
    (c * dx + s * dy, -s * dx + c * dy)
}

/// Encodes the target relative to the vehicle in the vehicle's own frame.
///
/// Pure: the same states always give the same observation. No normalization is
/// applied; the policy sees raw scene units.
pub fn encode(vehicle: &VehicleState, target: &TargetState) -> Observation {
    let dx = target.x - vehicle.x;
    let dy = target.y - vehicle.y;
    let (x_rel, y_rel) = world_to_body(dx, dy, vehicle.yaw);

    // No lateral slip: the vehicle's velocity lies along its heading.
    let (s, c) = vehicle.yaw.sin_cos();
    let vx_w = target.vx - vehicle.v * c;
    let vy_w = target.vy - vehicle.v * s;
    let (vx_rel, vy_rel) = world_to_body(vx_w, vy_w, vehicle.yaw);

    Observation([x_rel, y_rel, vx_rel, vy_rel, vehicle.v])
}
