use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{dto::events::ServerEvent, services::events, state::SharedState};

/// Attach a viewer to the hub and prime it with the current document.
pub async fn subscribe_viewer(
    state: &SharedState,
) -> (Option<ServerEvent>, broadcast::Receiver<ServerEvent>) {
    let receiver = state.hub().subscribe();
    let board = state.store().load().await;
    (events::score_update_event(&board), receiver)
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    initial: Option<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(snapshot) = initial {
            if tx.send(Ok(to_sse_event(&snapshot))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_sse_event(&payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Every score_update carries the whole document, so the next one resyncs.
                            warn!(skipped, "SSE viewer lagged behind");
                            continue;
                        }
                    }
                }
            }
        }

        info!("viewer SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse_event(payload: &ServerEvent) -> Event {
    Event::default()
        .event(&payload.event)
        .data(payload.payload.to_string())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, response::IntoResponse};
    use http_body_util::BodyExt;

    use super::*;
    use crate::{
        services::{events::EVENT_SCORE_UPDATE, scoreboard_service},
        test_support::test_state,
    };

    async fn next_chunk(body: &mut Body) -> String {
        let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
            .await
            .expect("event within deadline")
            .expect("stream still open")
            .unwrap();
        String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn viewer_is_primed_with_current_state() {
        let (state, _dir) = test_state();
        let (initial, _receiver) = subscribe_viewer(&state).await;
        let initial = initial.unwrap();
        assert_eq!(initial.event, EVENT_SCORE_UPDATE);
        assert_eq!(initial.payload["data"]["team1"]["name"], "Team 1");
        assert_eq!(state.hub().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn live_events_follow_the_primer() {
        let (state, _dir) = test_state();
        let (initial, receiver) = subscribe_viewer(&state).await;
        let mut body = to_sse_stream(initial, receiver).into_response().into_body();

        let primer = next_chunk(&mut body).await;
        assert!(primer.contains("event: score_update"), "{primer}");
        assert!(primer.contains(r#""name":"Team 1""#), "{primer}");

        scoreboard_service::declare_winner(&state, Some("team2".into()))
            .await
            .unwrap();

        let winner = next_chunk(&mut body).await;
        assert!(winner.contains("event: winner_declared"), "{winner}");
        assert!(winner.contains(r#"data: {"winner":"team2"}"#), "{winner}");

        let update = next_chunk(&mut body).await;
        assert!(update.contains("event: score_update"), "{update}");
        assert!(update.contains(r#""winner":"team2""#), "{update}");
    }

    #[tokio::test]
    async fn closing_the_stream_releases_the_subscription() {
        let (state, _dir) = test_state();
        let (initial, receiver) = subscribe_viewer(&state).await;
        let mut body = to_sse_stream(initial, receiver).into_response().into_body();
        next_chunk(&mut body).await;
        assert_eq!(state.hub().subscriber_count(), 1);

        drop(body);
        for _ in 0..100 {
            if state.hub().subscriber_count() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("SSE forwarder still subscribed");
    }
}
