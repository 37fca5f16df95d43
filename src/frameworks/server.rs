// Framework bootstrap for the control server runtime.

use crate::domain::{NoPolicy, Policy};
use crate::frameworks::config;
use crate::interface_adapters::clients::inference::HttpPolicy;
use crate::interface_adapters::http::health_handler;
use crate::interface_adapters::net::{spawn_state_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ControlLoop, ControlSettings, LoopSettings, spawn_control_loop};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{broadcast, watch};

/// Loads `.env`, installs the log subscriber and routes panics through it.
fn init_runtime() {
    let _ = dotenvy::dotenv();
    install_subscriber(matches!(
        std::env::var("LOG_FORMAT").as_deref(),
        Ok("json")
    ));
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// `RUST_LOG` wins over the default `info` level. JSON output keeps the
// `conn` span so per-connection lines can be grouped.
fn install_subscriber(json: bool) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let output = if json {
        fmt::layer()
            .with_target(false)
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(false).compact().boxed()
    };

    tracing_subscriber::registry().with(filter).with(output).init();
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone());

    tracing::info!(%address, "listening");

    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    state.control.stop();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_policy() -> Result<Arc<dyn Policy>> {
    let Some(base_url) = config::policy_service_url() else {
        tracing::info!("no policy service configured; heuristic control only");
        return Ok(Arc::new(NoPolicy));
    };

    let timeout = config::policy_timeout();
    let policy = HttpPolicy::new(base_url.clone(), timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize policy client: {e}")))?;
    tracing::debug!(
        policy_base_url = %base_url,
        policy_timeout_ms = timeout.as_millis(),
        "policy client configured"
    );
    Ok(Arc::new(policy))
}

fn build_state() -> Result<Arc<AppState>> {
    let mut settings = ControlSettings::default();
    if let Some(width) = config::arena_width() {
        settings.arena.width = width;
    }
    if let Some(height) = config::arena_height() {
        settings.arena.height = height;
    }

    // Rejects a bad physics configuration before any task starts.
    let control = ControlLoop::new(settings).map_err(|e| {
        tracing::error!(error = %e, "invalid control configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let policy = build_policy()?;
    let tick_interval = config::tick_interval();
    let handle = spawn_control_loop(
        control,
        policy,
        LoopSettings {
            event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
            update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
            tick_interval,
            max_dt: config::MAX_TICK_DT,
            policy_budget: config::policy_timeout(),
        },
    );

    // Serialized reports shared by every socket, plus the latest one for lag recovery.
    let (state_bytes_tx, _state_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::UPDATE_BROADCAST_CAPACITY);
    let (state_latest_tx, _state_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));

    let state = AppState {
        control: handle,
        state_bytes_tx,
        state_latest_tx,
    };
    spawn_state_serializer(&state);

    Ok(Arc::new(state))
}
