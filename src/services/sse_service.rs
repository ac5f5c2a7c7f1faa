use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::state::hub::ClientSubscription;

/// Forward a hub subscription to an SSE response, one event per dashboard message.
///
/// The subscription lives in a forwarder task and is dropped, unregistering
/// the client, once the response stream goes away.
pub fn to_sse_stream(
    mut subscription: ClientSubscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);
    let client = subscription.id();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                frame = subscription.recv() => {
                    let Some(frame) = frame else { break };
                    if tx.send(Ok(Event::default().data(&*frame))).await.is_err() {
                        break;
                    }
                }
            }
        }
        info!(%client, "dashboard SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
