// Tick driver: owns the control loop inside one tokio task and publishes each tick.

use crate::domain::Policy;
use crate::use_cases::control_loop::ControlLoop;
use crate::use_cases::types::{ActionSource, ControlEvent, TickReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Runtime settings for a spawned control loop.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Capacity for inbound host events.
    pub event_channel_capacity: usize,
    /// Capacity for broadcast tick reports.
    pub update_broadcast_capacity: usize,
    /// Fixed tick interval for the loop.
    pub tick_interval: Duration,
    /// Upper bound on the integration step after a stall.
    pub max_dt: Duration,
    /// Time a policy call may take; never more than one tick interval.
    pub policy_budget: Duration,
}

/// Channels for talking to a running control task.
#[derive(Clone)]
pub struct ControlHandle {
    /// Sender for host events into the control task.
    pub event_tx: mpsc::Sender<ControlEvent>,
    /// Broadcast sender for per-tick reports.
    pub update_tx: broadcast::Sender<TickReport>,
    /// Signals the task to stop between ticks.
    pub shutdown: Arc<Notify>,
    /// Name of the policy backing the loop.
    pub policy_name: Arc<str>,
}

impl ControlHandle {
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

/// Spawns the control task and returns its handle.
pub fn spawn_control_loop(
    control: ControlLoop,
    policy: Arc<dyn Policy>,
    settings: LoopSettings,
) -> ControlHandle {
    let (event_tx, event_rx) = mpsc::channel::<ControlEvent>(settings.event_channel_capacity);
    let (update_tx, _update_rx) =
        broadcast::channel::<TickReport>(settings.update_broadcast_capacity);
    let shutdown = Arc::new(Notify::new());
    let policy_name: Arc<str> = Arc::from(policy.name());

    tokio::spawn(control_task(
        event_rx,
        update_tx.clone(),
        control,
        policy,
        settings,
        shutdown.clone(),
    ));

    ControlHandle {
        event_tx,
        update_tx,
        shutdown,
        policy_name,
    }
}

const FALLBACK_LOG_THROTTLE: Duration = Duration::from_secs(2);

// Rate-limits fallback logging; the heuristic may cover every tick when no policy runs.
struct FallbackLog {
    count: u64,
    since_last_log: u64,
    last_log: Option<Instant>,
}

impl FallbackLog {
    fn record(&mut self, source: &ActionSource) {
        let ActionSource::Heuristic(reason) = source else {
            return;
        };
        self.count += 1;
        self.since_last_log += 1;

        let now = Instant::now();
        let due = self
            .last_log
            .is_none_or(|last| now.duration_since(last) >= FALLBACK_LOG_THROTTLE);
        if due {
            debug!(
                reason = reason.label(),
                detail = %reason,
                fallbacks = self.count,
                recent = self.since_last_log,
                "policy fallback"
            );
            self.last_log = Some(now);
            self.since_last_log = 0;
        }
    }
}

pub async fn control_task(
    mut event_rx: mpsc::Receiver<ControlEvent>,
    update_tx: broadcast::Sender<TickReport>,
    mut control: ControlLoop,
    policy: Arc<dyn Policy>,
    settings: LoopSettings,
    shutdown: Arc<Notify>,
) {
    let budget = settings.policy_budget.min(settings.tick_interval);
    let max_dt = settings.max_dt.as_secs_f64();

    // Drive the loop at the configured tick rate; late ticks are not replayed.
    let mut interval = tokio::time::interval(settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();
    let mut fallbacks = FallbackLog {
        count: 0,
        since_last_log: 0,
        last_log: None,
    };

    info!(
        policy = policy.name(),
        tick_ms = settings.tick_interval.as_millis() as u64,
        budget_ms = budget.as_millis() as u64,
        "control loop running"
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Stop between ticks; nothing is mid-flight here.
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(ev) = event_rx.try_recv() {
            match ev {
                ControlEvent::Reference { x, y } => control.set_reference(x, y),
                ControlEvent::Resize { width, height } => {
                    info!(width, height, "arena resized");
                    control.resize(width, height);
                }
                ControlEvent::Reset => {
                    info!("control loop reset");
                    control.reset();
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64().min(max_dt);
        last = now;

        let report = match control.tick(dt, policy.as_ref(), budget).await {
            Ok(report) => report,
            Err(e) => {
                // Monotonic clock keeps dt >= 0; only misconfiguration lands here.
                error!(error = %e, "tick rejected");
                continue;
            }
        };
        fallbacks.record(&report.source);

        let _ = update_tx.send(report);
    }

    info!(
        ticks = control.tick_count(),
        fallbacks = fallbacks.count,
        "control loop stopped"
    );
}
