use std::time::{Duration, SystemTime};

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
    time::timeout,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{events::ServerEvent, ws::ViewerInboundMessage},
    services::{events, scoreboard_service},
    state::{SharedState, ViewerConnection},
};

/// Longest a single frame may take to reach a viewer before it is dropped.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
enum ViewerError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle of a viewer WebSocket connection.
///
/// The viewer gets the current document right away, then every broadcast event until
/// it disconnects or stops keeping up.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let viewer_id = Uuid::new_v4();
    let (sender, mut receiver) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();
    let writer_task = spawn_writer(sender, outbound_rx, viewer_id, SEND_TIMEOUT);

    // Subscribe before reading the snapshot so no commit falls between the two.
    let mut updates = state.hub().subscribe();
    state.viewers().insert(
        viewer_id,
        ViewerConnection {
            id: viewer_id,
            connected_at: SystemTime::now(),
        },
    );
    info!(id = %viewer_id, viewers = state.viewers().len(), "viewer connected");

    if send_snapshot(&state, &outbound_tx).await.is_ok() {
        loop {
            tokio::select! {
                _ = outbound_tx.closed() => break,
                received = updates.recv() => match received {
                    Ok(event) => {
                        if forward_event(&outbound_tx, &event).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(id = %viewer_id, skipped, "viewer lagged; resending current state");
                        if send_snapshot(&state, &outbound_tx).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
                inbound = receiver.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ViewerInboundMessage>(text.as_str()) {
                            Ok(ViewerInboundMessage::Refresh) => {
                                if send_snapshot(&state, &outbound_tx).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ViewerInboundMessage::Unknown) => {
                                debug!(id = %viewer_id, "ignoring unknown viewer message");
                            }
                            Err(err) => {
                                warn!(id = %viewer_id, error = %err, "failed to parse viewer message");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = outbound_tx.send(Message::Pong(payload));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let _ = outbound_tx.send(Message::Close(frame));
                        break;
                    }
                    Some(Ok(Message::Binary(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Err(err)) => {
                        warn!(id = %viewer_id, error = %err, "websocket error");
                        break;
                    }
                    None => break,
                },
            }
        }
    }

    state.viewers().remove(&viewer_id);
    info!(id = %viewer_id, viewers = state.viewers().len(), "viewer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
///
/// The task ends, closing the channel, once a send fails or takes longer than
/// `send_timeout`.
fn spawn_writer<S>(
    mut sink: S,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    viewer_id: Uuid,
    send_timeout: Duration,
) -> JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Send,
{
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            match timeout(send_timeout, sink.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => break,
                Err(_) => {
                    warn!(id = %viewer_id, "viewer send timed out; dropping connection");
                    break;
                }
            }
        }
    })
}

/// Push the current document to a single viewer as a `score_update`.
async fn send_snapshot(
    state: &SharedState,
    tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), ViewerError> {
    let board = scoreboard_service::get_state(state).await;
    match events::score_update_event(&board) {
        Some(event) => forward_event(tx, &event),
        None => Ok(()),
    }
}

/// Queue an event frame for the writer task.
///
/// Serialization failures are logged and swallowed; only a closed writer is an error.
fn forward_event(
    tx: &mpsc::UnboundedSender<Message>,
    event: &ServerEvent,
) -> Result<(), ViewerError> {
    let frame = match event.to_frame() {
        Ok(frame) => frame,
        Err(err) => {
            warn!(event = %event.event, error = %err, "failed to serialise viewer frame");
            return Ok(());
        }
    };

    tx.send(Message::Text(frame.into()))
        .map_err(|_| ViewerError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
