use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::{services::broadcast_events, state::SharedState};

/// Handle the full lifecycle of a dashboard WebSocket connection.
///
/// The client first receives its `initialData` snapshot, then every broadcast.
/// Inbound text is ignored; the dashboard drives commands over HTTP.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let mut subscription = broadcast_events::register_client(&state).await;
    let client = subscription.id();
    let (mut sender, mut receiver) = socket.split();
    info!(%client, "dashboard websocket connected");

    loop {
        tokio::select! {
            frame = subscription.recv() => {
                let Some(frame) = frame else { break };
                if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            message = receiver.next() => match message {
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let _ = sender.send(Message::Close(frame)).await;
                    break;
                }
                Some(Ok(Message::Text(text))) => {
                    debug!(%client, payload = text.as_str(), "ignoring inbound dashboard message");
                }
                Some(Ok(Message::Binary(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Err(err)) => {
                    warn!(%client, error = %err, "websocket error");
                    break;
                }
                None => break,
            }
        }
    }

    info!(%client, "dashboard websocket disconnected");
}
