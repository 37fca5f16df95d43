// Domain layer: vehicle/target state, tuning and the per-tick rules.

pub mod angle;
pub mod errors;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use errors::{ConfigError, PolicyError};
pub use ports::{NoPolicy, Policy};
pub use state::{Action, Bounds, Observation, RawAction, TargetState, VehicleState};
