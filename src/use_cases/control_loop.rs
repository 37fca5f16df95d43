// One-tick orchestration over state owned exclusively by the loop.

use crate::domain::systems::{observation, target_dynamics, vehicle_dynamics};
use crate::domain::tuning::{ArenaTuning, ControlParams, HeuristicTuning, TargetTuning};
use crate::domain::{
    Bounds, ConfigError, Observation, Policy, PolicyError, RawAction, TargetState, VehicleState,
};
use crate::use_cases::arbiter::ActionArbiter;
use crate::use_cases::types::{Decision, TickReport};
use std::time::Duration;

/// Everything a loop needs at construction; validated once up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlSettings {
    pub params: ControlParams,
    pub target: TargetTuning,
    pub heuristic: HeuristicTuning,
    pub arena: ArenaTuning,
}

// Target position/velocity and observation computed for a tick that has not been
// applied yet. Keeping it off `self` means a cancelled async tick leaves no trace.
struct PreparedTick {
    target: TargetState,
    observation: Observation,
}

#[derive(Debug, Clone)]
pub struct ControlLoop {
    vehicle: VehicleState,
    target: TargetState,
    reference: (f64, f64),
    bounds: Bounds,
    params: ControlParams,
    target_tuning: TargetTuning,
    arbiter: ActionArbiter,
    tick: u64,
}

impl ControlLoop {
    /// Builds a loop with vehicle, target and reference centered in the arena.
    pub fn new(settings: ControlSettings) -> Result<Self, ConfigError> {
        settings.params.validate()?;
        settings.target.validate()?;

        let bounds = settings.arena.bounds();
        let (cx, cy) = bounds.center();
        Ok(Self {
            vehicle: VehicleState::new(cx, cy, 0.0, settings.params.wheelbase),
            target: TargetState::at(cx, cy),
            reference: (cx, cy),
            bounds,
            params: settings.params,
            target_tuning: settings.target,
            arbiter: ActionArbiter::new(settings.params, settings.heuristic),
            tick: 0,
        })
    }

    /// Replaces the vehicle state, e.g. to start from a known pose.
    ///
    /// The wheelbase always comes from the validated `ControlParams`.
    pub fn with_vehicle(mut self, vehicle: VehicleState) -> Self {
        self.vehicle = VehicleState {
            wheelbase: self.params.wheelbase,
            ..vehicle
        };
        self
    }

    pub fn with_target(mut self, target: TargetState) -> Self {
        self.target = target;
        self
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn reference(&self) -> (f64, f64) {
        self.reference
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Stores the host reference point read by the next tick. Not sanitized here.
    pub fn set_reference(&mut self, x: f64, y: f64) {
        self.reference = (x, y);
    }

    /// Applies a new visible region and pulls both entities back inside it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.bounds = Bounds::new(width, height, self.bounds.margin);
        let (vx, vy) = self.bounds.clamp_point(self.vehicle.x, self.vehicle.y);
        self.vehicle.x = vx;
        self.vehicle.y = vy;
        let (tx, ty) = self.bounds.clamp_point(self.target.x, self.target.y);
        self.target.x = tx;
        self.target.y = ty;
    }

    /// Re-centers vehicle, target and reference; the tick counter keeps running.
    pub fn reset(&mut self) {
        let (cx, cy) = self.bounds.center();
        self.vehicle = VehicleState::new(cx, cy, 0.0, self.params.wheelbase);
        self.target = TargetState::at(cx, cy);
        self.reference = (cx, cy);
    }

    /// Current observation without advancing anything.
    pub fn observe(&self) -> Observation {
        observation::encode(&self.vehicle, &self.target)
    }

    /// Runs one tick with a synchronous policy outcome.
    pub fn tick_with<F>(&mut self, dt: f64, policy: F) -> Result<TickReport, ConfigError>
    where
        F: FnOnce(&Observation) -> Result<RawAction, PolicyError>,
    {
        let prepared = self.prepare(dt)?;
        let outcome = policy(&prepared.observation);
        let decision = self
            .arbiter
            .decide(outcome, &self.vehicle, &prepared.target);
        Ok(self.apply(dt, prepared, decision))
    }

    /// Runs one tick, giving `policy` at most `budget` to answer.
    ///
    /// State is only written after the policy call settles, so dropping this future
    /// leaves the loop exactly as of the last completed tick.
    pub async fn tick(
        &mut self,
        dt: f64,
        policy: &dyn Policy,
        budget: Duration,
    ) -> Result<TickReport, ConfigError> {
        let prepared = self.prepare(dt)?;
        let decision = self
            .arbiter
            .decide_with(
                prepared.observation,
                policy,
                budget,
                &self.vehicle,
                &prepared.target,
            )
            .await;
        Ok(self.apply(dt, prepared, decision))
    }

    fn prepare(&self, dt: f64) -> Result<PreparedTick, ConfigError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(ConfigError::InvalidTimestep);
        }

        let mut target = self.target;
        target_dynamics::advance(
            &mut target,
            self.reference,
            dt,
            &self.target_tuning,
            &self.bounds,
        );
        let observation = observation::encode(&self.vehicle, &target);
        Ok(PreparedTick {
            target,
            observation,
        })
    }

    fn apply(&mut self, dt: f64, prepared: PreparedTick, decision: Decision) -> TickReport {
        self.target = prepared.target;
        vehicle_dynamics::step(
            &mut self.vehicle,
            decision.action.steer,
            decision.action.accel,
            dt,
            &self.params,
        );
        let (x, y) = self.bounds.clamp_point(self.vehicle.x, self.vehicle.y);
        self.vehicle.x = x;
        self.vehicle.y = y;
        self.tick += 1;

        TickReport {
            tick: self.tick,
            vehicle: self.vehicle,
            target: self.target,
            action: decision.action,
            source: decision.source,
        }
    }
}
