// Domain-level simulation state and per-tick value types.

/// Kinematic bicycle state for the single simulated vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, kept in (-PI, PI].
    pub yaw: f64,
    /// Scalar forward speed in scene units per second.
    pub v: f64,
    /// Wheelbase length (constant for a session).
    pub wheelbase: f64,
    /// Last applied (clamped) steering angle.
    pub delta: f64,
}

impl VehicleState {
    /// Creates a vehicle at rest with a straight wheel.
    pub fn new(x: f64, y: f64, yaw: f64, wheelbase: f64) -> Self {
        Self {
            x,
            y,
            yaw,
            v: 0.0,
            wheelbase,
            delta: 0.0,
        }
    }
}

/// Virtual pursuit point trailing the host reference point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl TargetState {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Number of floats in an observation vector.
pub const OBSERVATION_LEN: usize = 5;

/// Ego-frame observation: `[x_rel, y_rel, vx_rel, vy_rel, v]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation(pub [f64; OBSERVATION_LEN]);

impl Observation {
    pub fn x_rel(&self) -> f64 {
        self.0[0]
    }

    pub fn y_rel(&self) -> f64 {
        self.0[1]
    }

    pub fn vx_rel(&self) -> f64 {
        self.0[2]
    }

    pub fn vy_rel(&self) -> f64 {
        self.0[3]
    }

    pub fn speed(&self) -> f64 {
        self.0[4]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Unscaled policy output, nominally in [-1, 1] on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawAction {
    pub steer: f64,
    pub accel: f64,
}

impl RawAction {
    /// Clips both axes into the [-1, 1] range the policy was trained on.
    pub fn clipped(self) -> Self {
        Self {
            steer: self.steer.clamp(-1.0, 1.0),
            accel: self.accel.clamp(-1.0, 1.0),
        }
    }
}

/// Physical steering/acceleration command handed to the vehicle model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Action {
    /// Steering angle command in radians.
    pub steer: f64,
    /// Longitudinal acceleration command in scene units per second squared.
    pub accel: f64,
}

/// Host-provided visible region; entities are kept `margin` away from its edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64, margin: f64) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Clamps a point into `[margin, extent - margin]` on both axes.
    ///
    /// When the region is narrower than twice the margin the axis collapses onto its
    /// midpoint instead of panicking inside `f64::clamp`.
    pub fn clamp_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            clamp_axis(x, self.margin, self.width),
            clamp_axis(y, self.margin, self.height),
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (cx, cy) = self.clamp_point(x, y);
        cx == x && cy == y
    }
}

fn clamp_axis(value: f64, margin: f64, extent: f64) -> f64 {
    let lo = margin;
    let hi = extent - margin;
    if lo > hi {
        return extent / 2.0;
    }
    value.clamp(lo, hi)
}
