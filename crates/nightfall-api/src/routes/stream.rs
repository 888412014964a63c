//! WebSocket stream of session events.
//!
//! A client first receives the current snapshot, then one message per
//! session event. A client that falls behind the broadcast buffer is told how
//! many events it missed and should re-read the snapshot.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use nightfall_core::publisher::StoredEvent;
use nightfall_session::application::query_handlers::{self, SessionSnapshot};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Message type of the first frame sent to a new client.
pub const SNAPSHOT_MESSAGE_TYPE: &str = "session.snapshot";
/// Message type sent when a client skipped events.
pub const LAGGED_MESSAGE_TYPE: &str = "stream.lagged";

/// One frame on the event stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMessage {
    /// Event type, or one of the stream's own message types.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Position in the session's event stream, for events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,
    /// Message body.
    pub payload: Value,
}

impl StreamMessage {
    fn snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            message_type: SNAPSHOT_MESSAGE_TYPE.to_string(),
            sequence_number: None,
            payload: json!(snapshot),
        }
    }

    fn event(event: &StoredEvent) -> Self {
        Self {
            message_type: event.event_type.clone(),
            sequence_number: Some(event.sequence_number),
            payload: event.payload.clone(),
        }
    }

    fn lagged(skipped: u64) -> Self {
        Self {
            message_type: LAGGED_MESSAGE_TYPE.to_string(),
            sequence_number: None,
            payload: json!({ "skipped": skipped }),
        }
    }
}

/// GET /events
#[instrument(skip(state, ws))]
async fn stream_events(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    // Subscribe under the lock so no event falls between snapshot and stream.
    let (initial_message, rx) = state.with_session(|session, _, _| {
        Ok((
            StreamMessage::snapshot(&query_handlers::get_snapshot(session)),
            state.publisher.subscribe(),
        ))
    })?;

    Ok(ws.on_upgrade(move |socket| stream_socket(socket, rx, initial_message)))
}

async fn stream_socket(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<StoredEvent>,
    initial_message: StreamMessage,
) {
    if send_stream_message(&mut socket, &initial_message)
        .await
        .is_err()
    {
        return;
    }
    debug!("stream client connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => {
                        break;
                    }
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok(event) => {
                        if send_stream_message(&mut socket, &StreamMessage::event(&event))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "stream client lagged");
                        if send_stream_message(&mut socket, &StreamMessage::lagged(skipped))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }
    debug!("stream client disconnected");
}

async fn send_stream_message(
    socket: &mut WebSocket,
    message: &StreamMessage,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(message).map_err(axum::Error::new)?;
    socket.send(Message::Text(payload.into())).await
}

/// Returns the router for the event stream.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(stream_events))
}
