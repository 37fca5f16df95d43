// Use-case level inputs/outputs for the control loop.

use crate::domain::{Action, PolicyError, TargetState, VehicleState};

/// Host inputs consumed by the control task between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Latest pointer position in scene coordinates.
    Reference { x: f64, y: f64 },
    /// Viewport size changed.
    Resize { width: f64, height: f64 },
    /// Re-center vehicle and target.
    Reset,
}

/// Where a tick's action came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSource {
    Policy,
    Heuristic(PolicyError),
}

impl ActionSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ActionSource::Heuristic(_))
    }
}

/// Arbitrated action for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub source: ActionSource,
}

/// Read-only result of a completed tick, handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub vehicle: VehicleState,
    pub target: TargetState,
    pub action: Action,
    pub source: ActionSource,
}
