use std::{env, time::Duration};

// Runtime/server constants (not physics tuning).

pub fn http_port() -> u16 {
    env::var("CONTROL_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3010)
}

// Unset or blank means heuristic-only control.
pub fn policy_service_url() -> Option<String> {
    env::var("POLICY_SERVICE_URL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn policy_timeout() -> Duration {
    let millis = env::var("POLICY_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(12);
    Duration::from_millis(millis)
}

pub fn tick_interval() -> Duration {
    let hz = env::var("TICK_RATE_HZ")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(60);
    Duration::from_secs_f64(1.0 / f64::from(hz))
}

pub fn arena_width() -> Option<f64> {
    positive_f64("ARENA_WIDTH")
}

pub fn arena_height() -> Option<f64> {
    positive_f64("ARENA_HEIGHT")
}

fn positive_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

pub const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const UPDATE_BROADCAST_CAPACITY: usize = 64;

// Largest integration step after a scheduler stall (about two frames at 60 Hz).
pub const MAX_TICK_DT: Duration = Duration::from_millis(33);
