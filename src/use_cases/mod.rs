// Use cases layer: arbitration, the control loop and its drivers.

pub mod arbiter;
pub mod control_loop;
pub mod control_task;
pub mod training;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use arbiter::ActionArbiter;
pub use control_loop::{ControlLoop, ControlSettings};
pub use control_task::{ControlHandle, LoopSettings, spawn_control_loop};
pub use training::{Step, TrainingConfig, TrainingEnv};
pub use types::{ActionSource, ControlEvent, Decision, TickReport};
