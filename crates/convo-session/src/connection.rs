use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use convo_db::Database;
use convo_types::events::{ClientCommand, ServerEvent};

use crate::session::Session;
use crate::transient::TransientSession;

/// Drive a persistent-mode session: poll-and-redraw on a fixed interval,
/// commands applied as they arrive. The poll is a deliberate busy-refresh,
/// not a push mechanism.
pub async fn handle_session(socket: WebSocket, db: Arc<Database>, poll_interval: Duration) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::new(db);
    let session_id = session.ctx.id;

    info!("session {} connected", session_id);

    let ready = ServerEvent::Ready { session_id };
    if send_event(&mut sender, &ready).await.is_err() {
        return;
    }

    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    'conn: loop {
        tokio::select! {
            _ = poll.tick() => {
                match session.refresh().await {
                    Ok(Some(event)) => {
                        if send_event(&mut sender, &event).await.is_err() {
                            break 'conn;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("session {} storage fault: {:#}", session_id, e);
                        break 'conn;
                    }
                }
            }

            frame = receiver.next() => {
                let Some(cmd) = next_command(frame) else {
                    break 'conn;
                };
                let Some(cmd) = cmd else {
                    continue;
                };

                match session.handle(cmd).await {
                    Ok(events) => {
                        for event in &events {
                            if send_event(&mut sender, event).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Err(e) => {
                        error!("session {} storage fault: {:#}", session_id, e);
                        break 'conn;
                    }
                }
            }
        }
    }

    // Presence is intentionally not removed here: membership lasts until
    // an explicit leave, even after the socket is gone.
    info!("session {} closed", session_id);
}

/// Drive a transient-mode session. No poll loop: every command produces
/// its own redraw, and the whole history dies with this function's locals.
pub async fn handle_transient_session(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = TransientSession::new();
    let session_id = session.ctx.id;

    info!("transient session {} connected", session_id);

    let ready = ServerEvent::Ready { session_id };
    if send_event(&mut sender, &ready).await.is_err() {
        return;
    }

    'conn: loop {
        let frame = receiver.next().await;
        let Some(cmd) = next_command(frame) else {
            break;
        };
        let Some(cmd) = cmd else {
            continue;
        };

        for event in session.handle(cmd) {
            if send_event(&mut sender, &event).await.is_err() {
                break 'conn;
            }
        }
    }

    info!("transient session {} closed", session_id);
}

/// Decode one inbound frame. Outer `None` means the connection is done;
/// inner `None` means the frame carried nothing actionable.
fn next_command(
    frame: Option<Result<WsMessage, axum::Error>>,
) -> Option<Option<ClientCommand>> {
    match frame {
        Some(Ok(WsMessage::Text(text))) => match serde_json::from_str::<ClientCommand>(&text) {
            Ok(cmd) => Some(Some(cmd)),
            Err(e) => {
                warn!("ignoring unparseable command: {}", e);
                Some(None)
            }
        },
        Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => None,
        Some(Ok(_)) => Some(None),
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, WsMessage>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    sender
        .send(WsMessage::Text(
            serde_json::to_string(event).unwrap().into(),
        ))
        .await
}
