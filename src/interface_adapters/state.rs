use crate::use_cases::ControlHandle;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, watch};

#[derive(Clone)]
pub struct AppState {
    // Host events into the control task, plus per-tick reports out of it.
    pub control: ControlHandle,
    // Serialized tick reports, shared across all connections.
    pub state_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized report for lag recovery.
    pub state_latest_tx: watch::Sender<Utf8Bytes>,
}
