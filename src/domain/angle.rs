use std::f64::consts::{PI, TAU};

/// Normalizes an angle into (-PI, PI].
///
/// Works for any finite magnitude in constant time; non-finite input is returned as-is.
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }

    let mut wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid lands on [-PI, PI); fold the open end over.
    if wrapped <= -PI {
        wrapped += TAU;
    }
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}
