use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rl_car_server::domain::tuning::{ArenaTuning, ControlParams, TargetTuning};
use rl_car_server::domain::{
    Observation, Policy, PolicyError, RawAction, TargetState, VehicleState,
};
use rl_car_server::use_cases::{ActionSource, ControlLoop, ControlSettings};
use std::f64::consts::PI;
use std::time::Duration;

fn open_field() -> ControlLoop {
    ControlLoop::new(ControlSettings {
        arena: ArenaTuning {
            width: 2000.0,
            height: 2000.0,
            margin: 0.0,
        },
        ..ControlSettings::default()
    })
    .expect("valid settings")
}

fn unavailable(_: &Observation) -> Result<RawAction, PolicyError> {
    Err(PolicyError::Unavailable)
}

#[test]
fn when_reference_is_held_then_target_settles_without_exceeding_speed_cap() {
    let cap = TargetTuning::default().max_speed;
    let mut control = open_field()
        .with_vehicle(VehicleState::new(0.0, 0.0, 0.0, 48.0))
        .with_target(TargetState::at(0.0, 0.0));
    control.set_reference(100.0, 0.0);

    let mut peak_x: f64 = 0.0;
    for _ in 0..60 {
        let report = control.tick_with(0.016, unavailable).expect("valid dt");
        assert!(report.target.speed() <= cap);
        peak_x = peak_x.max(report.target.x);
    }
    // kp=15, kd=2 is underdamped: it overshoots but stays bounded.
    assert!(peak_x > 100.0 && peak_x < 150.0, "peak {peak_x}");

    for _ in 60..200 {
        let report = control.tick_with(0.016, unavailable).expect("valid dt");
        assert!(report.target.speed() <= cap);
    }
    let target = control.target();
    assert!((target.x - 100.0).abs() < 5.0, "target x {}", target.x);
    assert_eq!(target.y, 0.0);
}

#[test]
fn when_policy_always_fails_then_heuristic_commands_stay_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..500 {
        let vehicle = VehicleState::new(
            rng.gen_range(0.0..2000.0),
            rng.gen_range(0.0..2000.0),
            rng.gen_range(-PI..PI),
            48.0,
        );
        let target = TargetState::at(rng.gen_range(0.0..2000.0), rng.gen_range(0.0..2000.0));
        let mut control = open_field().with_vehicle(vehicle).with_target(target);
        control.set_reference(target.x, target.y);

        let report = control
            .tick_with(0.016, |_| Err(PolicyError::Inference("boom".into())))
            .expect("valid dt");

        assert!(report.source.is_fallback());
        assert!((-0.6..=0.6).contains(&report.action.steer));
        assert!((-100.0..=300.0).contains(&report.action.accel));
    }
}

#[test]
fn when_vehicle_is_flung_past_the_edge_then_it_is_clamped_inside_margin() {
    let mut control = ControlLoop::new(ControlSettings {
        arena: ArenaTuning {
            width: 800.0,
            height: 600.0,
            margin: 50.0,
        },
        ..ControlSettings::default()
    })
    .expect("valid settings");
    let mut vehicle = VehicleState::new(700.0, 80.0, -PI / 4.0, 48.0);
    vehicle.v = 1.0e5;
    control = control.with_vehicle(vehicle);

    let report = control
        .tick_with(0.033, |_| {
            Ok(RawAction {
                steer: 0.0,
                accel: 0.0,
            })
        })
        .expect("valid dt");

    assert_eq!(report.vehicle.x, 750.0);
    assert_eq!(report.vehicle.y, 50.0);
}

#[test]
fn when_dt_is_zero_then_pose_is_unchanged_and_only_drag_applies() {
    let drag = ControlParams::default().drag_coefficient;
    let mut vehicle = VehicleState::new(900.0, 1100.0, 2.5, 48.0);
    vehicle.v = 120.0;
    let mut control = open_field().with_vehicle(vehicle);

    let report = control
        .tick_with(0.0, |_| {
            Ok(RawAction {
                steer: 1.0,
                accel: 1.0,
            })
        })
        .expect("zero dt is valid");

    assert_eq!(report.vehicle.x, 900.0);
    assert_eq!(report.vehicle.y, 1100.0);
    assert_eq!(report.vehicle.yaw, 2.5);
    assert_eq!(report.vehicle.v, 120.0 * drag);
    assert!(report.vehicle.v.is_finite());
}

struct SlowPolicy(Duration);

#[async_trait]
impl Policy for SlowPolicy {
    fn name(&self) -> &str {
        "slow"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        tokio::time::sleep(self.0).await;
        Ok(RawAction {
            steer: 1.0,
            accel: 1.0,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn when_policy_is_slower_than_budget_then_tick_falls_back_without_waiting() {
    let mut control = open_field();
    let policy = SlowPolicy(Duration::from_millis(50));
    let started = tokio::time::Instant::now();

    let report = control
        .tick(0.016, &policy, Duration::from_millis(10))
        .await
        .expect("valid dt");

    assert_eq!(report.source, ActionSource::Heuristic(PolicyError::Timeout));
    assert!(started.elapsed() < Duration::from_millis(50));
    assert_eq!(control.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn when_policy_answers_within_budget_then_its_action_drives_the_vehicle() {
    let mut control = open_field();
    let policy = SlowPolicy(Duration::from_millis(2));

    let report = control
        .tick(0.016, &policy, Duration::from_millis(10))
        .await
        .expect("valid dt");

    let params = ControlParams::default();
    assert_eq!(report.source, ActionSource::Policy);
    assert_eq!(report.action.steer, params.max_steer_angle);
    assert_eq!(report.action.accel, params.max_acceleration);
}
