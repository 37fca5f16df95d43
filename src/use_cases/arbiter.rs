// Action selection: learned policy when it answers, pure pursuit otherwise.

use crate::domain::ports::parse_raw_action;
use crate::domain::systems::pursuit::pure_pursuit;
use crate::domain::tuning::{ControlParams, HeuristicTuning};
use crate::domain::{
    Action, Observation, Policy, PolicyError, RawAction, TargetState, VehicleState,
};
use crate::use_cases::types::{ActionSource, Decision};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy)]
pub struct ActionArbiter {
    params: ControlParams,
    heuristic: HeuristicTuning,
}

impl ActionArbiter {
    pub fn new(params: ControlParams, heuristic: HeuristicTuning) -> Self {
        Self { params, heuristic }
    }

    /// Turns a policy outcome into a physical command.
    ///
    /// Successful output is scaled by the steering and acceleration limits as is.
    /// Any failure, including non-finite output, yields the pursuit heuristic.
    /// Clamping to the physical limits is left to the vehicle model.
    pub fn decide(
        &self,
        outcome: Result<RawAction, PolicyError>,
        vehicle: &VehicleState,
        target: &TargetState,
    ) -> Decision {
        match outcome.and_then(|raw| parse_raw_action(&[raw.steer, raw.accel])) {
            Ok(raw) => Decision {
                action: Action {
                    steer: raw.steer * self.params.max_steer_angle,
                    accel: raw.accel * self.params.max_acceleration,
                },
                source: ActionSource::Policy,
            },
            Err(reason) => Decision {
                action: pure_pursuit(vehicle, target, &self.heuristic),
                source: ActionSource::Heuristic(reason),
            },
        }
    }

    /// Queries `policy` once, waiting at most `budget`.
    ///
    /// A call still pending at the deadline is dropped, which cancels it; nothing is
    /// left running into the next tick and the heuristic covers this one.
    pub async fn decide_with(
        &self,
        observation: Observation,
        policy: &dyn Policy,
        budget: Duration,
        vehicle: &VehicleState,
        target: &TargetState,
    ) -> Decision {
        let outcome = match timeout(budget, policy.infer(observation)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(PolicyError::Timeout),
        };
        self.decide(outcome, vehicle, target)
    }
}
