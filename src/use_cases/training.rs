// Headless, seedable episode environment the policy is trained against.
//
// Shares the vehicle model and observation encoder with the live loop so a policy
// trained here sees the same physics it is deployed on.

use crate::domain::ports::parse_raw_action;
use crate::domain::systems::{observation, vehicle_dynamics};
use crate::domain::tuning::ControlParams;
use crate::domain::{ConfigError, Observation, PolicyError, TargetState, VehicleState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Episode parameters; defaults mirror the environment the shipped policy was trained in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub width: f64,
    pub height: f64,
    pub dt: f64,
    pub max_steps: u32,
    pub params: ControlParams,
    /// Speed cap for the random-walk target.
    pub target_max_speed: f64,
    /// Standard deviation of the target's random acceleration per axis.
    pub target_accel_std: f64,
    /// Range the target's initial speed is drawn from.
    pub target_initial_speed: (f64, f64),
    /// Distance under which the per-step bonus is paid.
    pub bonus_radius: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            dt: 0.02,
            max_steps: 1000,
            params: ControlParams::default(),
            target_max_speed: 240.0,
            target_accel_std: 500.0,
            target_initial_speed: (60.0, 180.0),
            bonus_radius: 15.0,
        }
    }
}

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub distance: f64,
}

pub struct TrainingEnv {
    config: TrainingConfig,
    rng: ChaCha8Rng,
    accel_noise: Normal<f64>,
    vehicle: VehicleState,
    target: TargetState,
    steps: u32,
}

impl TrainingEnv {
    pub fn new(config: TrainingConfig, seed: u64) -> Result<Self, ConfigError> {
        config.params.validate()?;
        if !(config.dt.is_finite() && config.dt > 0.0) {
            return Err(ConfigError::InvalidTimestep);
        }
        // Sampling ranges must be non-empty.
        if !(config.width.is_finite() && config.width > 0.0) {
            return Err(ConfigError::InvalidLimit("width"));
        }
        if !(config.height.is_finite() && config.height > 0.0) {
            return Err(ConfigError::InvalidLimit("height"));
        }
        let (lo, hi) = config.target_initial_speed;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ConfigError::InvalidLimit("target_initial_speed"));
        }
        let accel_noise = Normal::new(0.0, config.target_accel_std)
            .map_err(|_| ConfigError::InvalidGain("target_accel_std"))?;

        let mut env = Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            accel_noise,
            vehicle: VehicleState::new(0.0, 0.0, 0.0, config.params.wheelbase),
            target: TargetState::default(),
            steps: 0,
        };
        env.reset(None);
        Ok(env)
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    /// Starts a new episode; `seed` re-seeds the generator first.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        let TrainingConfig { width, height, .. } = self.config;

        self.vehicle = VehicleState::new(
            self.rng.gen_range(0.0..width),
            self.rng.gen_range(0.0..height),
            self.rng.gen_range(-PI..PI),
            self.config.params.wheelbase,
        );

        let heading = self.rng.gen_range(-PI..PI);
        let (lo, hi) = self.config.target_initial_speed;
        let speed = self.rng.gen_range(lo..hi);
        self.target = TargetState {
            x: self.rng.gen_range(0.0..width),
            y: self.rng.gen_range(0.0..height),
            vx: speed * heading.cos(),
            vy: speed * heading.sin(),
        };

        self.steps = 0;
        observation::encode(&self.vehicle, &self.target)
    }

    /// Advances one step with a normalized `[steer, accel]` action.
    ///
    /// Out-of-range components are clipped to [-1, 1]; anything that is not two
    /// finite values is rejected without touching the episode.
    pub fn step(&mut self, action: &[f64]) -> Result<Step, PolicyError> {
        let raw = parse_raw_action(action)?.clipped();
        let params = self.config.params;
        let dt = self.config.dt;

        let steer_cmd = raw.steer * params.max_steer_angle;
        let accel_cmd = raw.accel * params.max_acceleration;
        vehicle_dynamics::step(&mut self.vehicle, steer_cmd, accel_cmd, dt, &params);

        self.walk_target(dt);

        let (width, height) = (self.config.width, self.config.height);
        let (tx, tvx) = reflect(self.target.x, self.target.vx, 0.0, width);
        let (ty, tvy) = reflect(self.target.y, self.target.vy, 0.0, height);
        self.target = TargetState {
            x: tx,
            y: ty,
            vx: tvx,
            vy: tvy,
        };
        self.vehicle.x = reflect(self.vehicle.x, 0.0, 0.0, width).0;
        self.vehicle.y = reflect(self.vehicle.y, 0.0, 0.0, height).0;

        let observation = observation::encode(&self.vehicle, &self.target);
        let distance = observation.x_rel().hypot(observation.y_rel());
        let heading_err = observation.y_rel().atan2(observation.x_rel()).abs();
        let effort = raw.steer * raw.steer + raw.accel * raw.accel;
        let mut reward = -0.30 * distance - 0.05 * heading_err * heading_err - 0.001 * effort;
        if distance < self.config.bonus_radius {
            reward += 1.0;
        }

        self.steps += 1;
        Ok(Step {
            observation,
            reward,
            done: self.steps >= self.config.max_steps,
            distance,
        })
    }

    fn walk_target(&mut self, dt: f64) {
        self.target.vx += self.accel_noise.sample(&mut self.rng) * dt;
        self.target.vy += self.accel_noise.sample(&mut self.rng) * dt;
        let speed = self.target.speed();
        if speed > self.config.target_max_speed {
            let scale = self.config.target_max_speed / speed;
            self.target.vx *= scale;
            self.target.vy *= scale;
        }
        self.target.x += self.target.vx * dt;
        self.target.y += self.target.vy * dt;
    }
}

// Mirrors a position that crossed a border back inside and points its velocity inward.
fn reflect(pos: f64, vel: f64, lo: f64, hi: f64) -> (f64, f64) {
    let (mut pos, mut vel) = (pos, vel);
    if pos < lo {
        pos = lo + (lo - pos);
        vel = vel.abs();
    }
    if pos > hi {
        pos = hi - (pos - hi);
        vel = -vel.abs();
    }
    (pos, vel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(seed: u64) -> TrainingEnv {
        TrainingEnv::new(TrainingConfig::default(), seed).expect("valid config")
    }

    #[test]
    fn when_seeds_match_then_episodes_are_identical() {
        let mut a = env(42);
        let mut b = env(42);

        for _ in 0..200 {
            assert_eq!(a.step(&[0.3, 0.8]), b.step(&[0.3, 0.8]));
        }
    }

    #[test]
    fn when_reset_with_seed_then_episode_restarts_deterministically() {
        let mut env = env(1);
        let first = env.reset(Some(9));
        env.step(&[1.0, 1.0]).expect("valid action");

        let again = env.reset(Some(9));

        assert_eq!(first, again);
    }

    #[test]
    fn when_episode_runs_then_entities_stay_in_world_and_target_speed_is_capped() {
        let mut env = env(3);
        let config = TrainingConfig::default();

        for _ in 0..config.max_steps {
            let step = env.step(&[0.5, 1.0]).expect("valid action");
            assert!(env.target().speed() <= config.target_max_speed + 1e-9);
            assert!((0.0..=config.width).contains(&env.target().x));
            assert!((0.0..=config.height).contains(&env.target().y));
            assert!((0.0..=config.width).contains(&env.vehicle().x));
            assert!((0.0..=config.height).contains(&env.vehicle().y));
            assert!(step.reward.is_finite());
        }
    }

    #[test]
    fn when_max_steps_reached_then_episode_is_done() {
        let mut env = env(5);
        let config = TrainingConfig::default();

        for i in 1..=config.max_steps {
            let step = env.step(&[0.0, 0.0]).expect("valid action");
            assert_eq!(step.done, i == config.max_steps);
        }
    }

    #[test]
    fn when_action_overshoots_then_it_is_clipped_to_unit_range() {
        let mut wild = env(21);
        let mut unit = env(21);

        let a = wild.step(&[4.0, -7.5]).expect("finite action");
        let b = unit.step(&[1.0, -1.0]).expect("finite action");

        assert_eq!(a, b);
        assert_eq!(wild.vehicle(), unit.vehicle());
    }

    #[test]
    fn when_action_is_malformed_then_episode_is_untouched() {
        let mut env = env(8);
        let vehicle = *env.vehicle();

        assert!(matches!(
            env.step(&[f64::INFINITY, 0.0]),
            Err(PolicyError::Malformed(_))
        ));
        assert!(env.step(&[0.0]).is_err());
        assert_eq!(env.vehicle(), &vehicle);
    }

    #[test]
    fn when_far_from_target_then_reward_is_dominated_by_distance() {
        let mut env = env(11);

        let step = env.step(&[0.0, 0.0]).expect("valid action");

        assert!(step.reward <= -0.30 * step.distance + 1.0);
        assert!(step.reward < 0.0 || step.distance < 15.0);
    }

    #[test]
    fn when_position_crosses_border_then_it_is_mirrored_and_velocity_turns_inward() {
        assert_eq!(reflect(-5.0, -10.0, 0.0, 100.0), (5.0, 10.0));
        assert_eq!(reflect(104.0, 3.0, 0.0, 100.0), (96.0, -3.0));
        assert_eq!(reflect(50.0, -3.0, 0.0, 100.0), (50.0, -3.0));
    }
}
