use crate::interface_adapters::protocol::{TankMessage, TankUpdateDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{TankHandle, TankUpdate};

use axum::{
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

pub async fn tank_update_serializer(
    mut updates_rx: broadcast::Receiver<TankUpdate>,
    bytes_tx: broadcast::Sender<Utf8Bytes>,
    latest_bytes_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each tank update once and broadcast the shared bytes.
    loop {
        match updates_rx.recv().await {
            Ok(update) => {
                let msg = TankMessage::TankUpdate(TankUpdateDto::from(&update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize tank update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Store the latest bytes for lag recovery.
                let _ = latest_bytes_tx.send(bytes.clone());
                let _ = bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "tank serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("tank updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_tank_serializer(tank: &TankHandle) {
    tokio::spawn(tank_update_serializer(
        tank.updates_tx.subscribe(),
        tank.bytes_tx.clone(),
        tank.latest_bytes_tx.clone(),
    ));
}

pub async fn tank_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let tank = state.tank.clone();
    // Separate connection id for correlating a viewer's log lines.
    let span = info_span!("tank_viewer", conn_id = rand_id());
    ws.on_upgrade(move |socket| handle_socket(socket, tank).instrument(span))
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

// Viewers are read-only: inbound frames are drained and ignored until close.
async fn handle_socket(socket: WebSocket, tank: TankHandle) {
    // Subscribe before the first await so no update is missed.
    let mut bytes_rx = tank.bytes_tx.subscribe();
    let latest_rx = tank.latest_bytes_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("tank viewer connected");

    // Send what we have right away so the viewer doesn't wait a tick.
    let initial = latest_rx.borrow().clone();
    if !initial.is_empty() && sender.send(Message::Text(initial)).await.is_err() {
        return;
    }

    let mut msgs_out: u64 = 0;
    let mut lag_recoveries: u64 = 0;
    let mut last_lag_log = Instant::now() - LOG_THROTTLE;

    loop {
        let outgoing = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!(error = %e, "tank viewer socket error");
                    break;
                }
            },
            update = bytes_rx.recv() => match update {
                Ok(bytes) => bytes,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    lag_recoveries += 1;
                    if should_log(&mut last_lag_log) {
                        warn!(missed = n, count = lag_recoveries, "tank viewer lagged; sending latest snapshot");
                    }
                    // Resync strategy: skip straight to the newest snapshot.
                    let latest = latest_rx.borrow().clone();
                    if latest.is_empty() {
                        continue;
                    }
                    latest
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        if sender.send(Message::Text(outgoing)).await.is_err() {
            break;
        }
        msgs_out += 1;
    }

    info!(msgs_out, lag_recoveries, "tank viewer disconnected");
}
