// Per-tick simulation rules. Each system mutates only the state it is handed.

pub mod observation;
pub mod pursuit;
pub mod target_dynamics;
pub mod vehicle_dynamics;
