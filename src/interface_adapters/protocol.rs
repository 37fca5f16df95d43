// Wire protocol DTOs and conversions for the public websocket surface.
// Inference service DTOs live with the inference client.

use crate::domain::{TargetState, VehicleState};
use crate::use_cases::{ActionSource, ControlEvent, TickReport};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Per-tick vehicle and target state for the renderer.
    State(StateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Pointer position in scene coordinates.
    Pointer(PointerDto),
    // Viewport size after a resize.
    Resize(ResizeDto),
    // Re-center the vehicle and target.
    Reset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointerDto {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResizeDto {
    pub width: f64,
    pub height: f64,
}

impl ClientMessage {
    /// Converts to a control event, rejecting non-finite or non-positive values.
    pub fn into_event(self) -> Option<ControlEvent> {
        match self {
            ClientMessage::Pointer(PointerDto { x, y }) => (x.is_finite() && y.is_finite())
                .then_some(ControlEvent::Reference { x, y }),
            ClientMessage::Resize(ResizeDto { width, height }) => {
                let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
                valid.then_some(ControlEvent::Resize { width, height })
            }
            ClientMessage::Reset => Some(ControlEvent::Reset),
        }
    }
}

/// Snapshot of one tick sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct StateDto {
    pub tick: u64,
    pub vehicle: VehicleDto,
    pub target: TargetDto,
    // "policy" or "heuristic".
    pub source: &'static str,
    // Fallback reason when the heuristic drove this tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<&'static str>,
}

impl From<TickReport> for StateDto {
    fn from(report: TickReport) -> Self {
        let (source, fallback) = match &report.source {
            ActionSource::Policy => ("policy", None),
            ActionSource::Heuristic(reason) => ("heuristic", Some(reason.label())),
        };
        Self {
            tick: report.tick,
            vehicle: VehicleDto::from(&report.vehicle),
            target: TargetDto::from(&report.target),
            source,
            fallback,
        }
    }
}

/// Vehicle pose for drawing the sprite.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleDto {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub v: f64,
    pub delta: f64,
}

impl From<&VehicleState> for VehicleDto {
    fn from(vehicle: &VehicleState) -> Self {
        Self {
            x: vehicle.x,
            y: vehicle.y,
            yaw: vehicle.yaw,
            v: vehicle.v,
            delta: vehicle.delta,
        }
    }
}

/// Pursuit target position and velocity.
#[derive(Debug, Clone, Serialize)]
pub struct TargetDto {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl From<&TargetState> for TargetDto {
    fn from(target: &TargetState) -> Self {
        Self {
            x: target.x,
            y: target.y,
            vx: target.vx,
            vy: target.vy,
        }
    }
}
