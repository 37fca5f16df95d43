// Browser websocket: host events in, serialized tick reports out.

use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, StateDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ControlEvent, TickReport};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

#[derive(Debug)]
enum NetError {
    Ws(axum::Error),
    EventsClosed,
    StateUpdatesClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::EventsClosed => write!(f, "control event channel closed"),
            NetError::StateUpdatesClosed => write!(f, "state update channel closed"),
        }
    }
}

/// Serializes each tick report once and fans the bytes out to every socket.
pub async fn state_update_serializer(
    mut update_rx: broadcast::Receiver<TickReport>,
    state_bytes_tx: broadcast::Sender<Utf8Bytes>,
    state_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        let report = match update_rx.recv().await {
            Ok(report) => report,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "state serializer lagged; skipping to latest report");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("tick report channel closed; serializer exiting");
                break;
            }
        };

        let msg = ServerMessage::State(StateDto::from(report));
        match serde_json::to_string(&msg) {
            Ok(txt) => {
                let bytes = Utf8Bytes::from(txt);
                // The latest frame doubles as the join snapshot and the lag resync.
                let _ = state_latest_tx.send(bytes.clone());
                let _ = state_bytes_tx.send(bytes);
            }
            Err(e) => error!(error = ?e, "failed to serialize tick report"),
        }
    }
}

pub fn spawn_state_serializer(state: &AppState) {
    tokio::spawn(state_update_serializer(
        state.control.update_tx.subscribe(),
        state.state_bytes_tx.clone(),
        state.state_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id: u64 = rand::random();
        handle_socket(socket, state).instrument(info_span!("conn", conn_id))
    })
}

// Rate limit for one kind of warning.
struct Throttle(Option<Instant>);

impl Throttle {
    fn ready(&mut self) -> bool {
        let due = self.0.is_none_or(|last| last.elapsed() >= LOG_THROTTLE);
        if due {
            self.0 = Some(Instant::now());
        }
        due
    }
}

#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recoveries: u64,
}

enum Flow {
    Continue,
    Close(Option<CloseFrame>),
}

struct Connection {
    socket: WebSocket,
    event_tx: mpsc::Sender<ControlEvent>,
    stats: ConnStats,
    full_log: Throttle,
    invalid_log: Throttle,
    lag_log: Throttle,
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before any await so no report slips between snapshot and stream.
    let mut state_bytes_rx = state.state_bytes_tx.subscribe();
    let state_latest_rx = state.state_latest_tx.subscribe();

    let mut conn = Connection {
        socket,
        event_tx: state.control.event_tx.clone(),
        stats: ConnStats::default(),
        full_log: Throttle(None),
        invalid_log: Throttle(None),
        lag_log: Throttle(None),
    };
    info!("client connected");

    let initial = state_latest_rx.borrow().clone();
    let result = if !initial.is_empty() && !conn.send_state(initial).await {
        Ok(())
    } else {
        conn.run(&mut state_bytes_rx, &state_latest_rx).await
    };

    if let Err(e) = result {
        warn!(error = %e, "client loop exited with error");
    }
    debug!(stats = ?conn.stats, "connection stats");
    info!("client disconnected");
}

impl Connection {
    async fn run(
        &mut self,
        state_bytes_rx: &mut broadcast::Receiver<Utf8Bytes>,
        state_latest_rx: &watch::Receiver<Utf8Bytes>,
    ) -> Result<(), NetError> {
        loop {
            let flow = tokio::select! {
                incoming = self.socket.recv() => match incoming {
                    Some(Ok(msg)) => self.on_message(msg)?,
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket recv error");
                        Flow::Close(None)
                    }
                    None => Flow::Close(None),
                },

                update = state_bytes_rx.recv() => match update {
                    Ok(bytes) => self.forward(bytes).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if self.lag_log.ready() {
                            warn!(missed = n, "state updates lagged; sending snapshot");
                        }
                        // Jump to the newest report instead of replaying stale ticks.
                        let latest = state_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            Flow::Continue
                        } else {
                            self.stats.lag_recoveries += 1;
                            self.forward(latest).await
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        self.shutdown(None).await;
                        return Err(NetError::StateUpdatesClosed);
                    }
                },
            };

            if let Flow::Close(frame) = flow {
                self.shutdown(frame).await;
                return Ok(());
            }
        }
    }

    fn on_message(&mut self, msg: Message) -> Result<Flow, NetError> {
        let text = match msg {
            Message::Text(text) => text,
            Message::Binary(_) => {
                return Ok(Flow::Close(Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                })));
            }
            Message::Ping(_) | Message::Pong(_) => return Ok(Flow::Continue),
            Message::Close(_) => return Ok(Flow::Close(None)),
        };
        self.stats.msgs_in += 1;
        self.stats.bytes_in += text.len() as u64;

        let parsed = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(parsed) => parsed,
            Err(parse_err) => {
                self.stats.invalid_json += 1;
                if self.invalid_log.ready() {
                    warn!(
                        bytes = text.len(),
                        error = %parse_err,
                        "failed to parse client message"
                    );
                }
                if self.stats.invalid_json > MAX_INVALID_JSON {
                    return Ok(Flow::Close(Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: "too many invalid messages".into(),
                    })));
                }
                return Ok(Flow::Continue);
            }
        };

        let Some(event) = parsed.into_event() else {
            if self.invalid_log.ready() {
                warn!("non-finite or non-positive event values; dropping");
            }
            return Ok(Flow::Continue);
        };

        // A newer pointer position supersedes a dropped one, so a full queue is not fatal.
        match self.event_tx.try_send(event) {
            Ok(()) => Ok(Flow::Continue),
            Err(mpsc::error::TrySendError::Full(_)) => {
                if self.full_log.ready() {
                    warn!("event channel full; dropping host event");
                }
                Ok(Flow::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::EventsClosed),
        }
    }

    async fn forward(&mut self, bytes: Utf8Bytes) -> Flow {
        if self.send_state(bytes).await {
            Flow::Continue
        } else {
            Flow::Close(None)
        }
    }

    // Returns false once the socket can no longer be written.
    async fn send_state(&mut self, bytes: Utf8Bytes) -> bool {
        let len = bytes.len() as u64;
        match self.socket.send(Message::Text(bytes)).await {
            Ok(()) => {
                self.stats.msgs_out += 1;
                self.stats.bytes_out += len;
                true
            }
            Err(e) => {
                warn!(error = %NetError::Ws(e), "failed to send state update");
                false
            }
        }
    }

    async fn shutdown(&mut self, frame: Option<CloseFrame>) {
        if let Some(frame) = frame {
            let _ = self.socket.send(Message::Close(Some(frame))).await;
        }
        if let Err(e) = self.socket.close().await {
            debug!(error = %e, "socket close error");
        }
    }
}
