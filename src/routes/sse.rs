use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    services::{broadcast_events, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse",
    tag = "dashboard",
    responses((status = 200, description = "Read-only dashboard stream; first event is initialData", content_type = "text/event-stream", body = String))
)]
/// Stream dashboard messages to a read-only client.
pub async fn dashboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let subscription = broadcast_events::register_client(&state).await;
    info!(client = %subscription.id(), "new dashboard SSE connection");
    sse_service::to_sse_stream(subscription)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse", get(dashboard_stream))
}
