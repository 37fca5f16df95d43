use crate::domain::state::{Bounds, TargetState};
use crate::domain::tuning::TargetTuning;

/// Advances the pursuit target one step toward `reference` with PD acceleration.
///
/// The speed cap applies to velocity (direction preserved), not acceleration, so the
/// target may reverse sharply but never outruns `max_speed`.
pub fn advance(
    target: &mut TargetState,
    reference: (f64, f64),
    dt: f64,
    tuning: &TargetTuning,
    bounds: &Bounds,
) {
    let (ref_x, ref_y) = reference;
    let ax = tuning.kp * (ref_x - target.x) - tuning.kd * target.vx;
    let ay = tuning.kp * (ref_y - target.y) - tuning.kd * target.vy;

    target.vx += ax * dt;
    target.vy += ay * dt;
    cap_speed(target, tuning.max_speed);

    target.x += target.vx * dt;
    target.y += target.vy * dt;

    let (x, y) = bounds.clamp_point(target.x, target.y);
    target.x = x;
    target.y = y;
}

fn cap_speed(target: &mut TargetState, max_speed: f64) {
    let speed = target.speed();
    if speed > max_speed {
        let scale = max_speed / speed;
        target.vx *= scale;
        target.vy *= scale;
        // Rounding can leave the rescaled magnitude a hair above the cap.
        if target.speed() > max_speed {
            let nudge = 1.0 - f64::EPSILON;
            target.vx *= nudge;
            target.vy *= nudge;
        }
    }
}
