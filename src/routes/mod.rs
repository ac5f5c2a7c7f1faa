use axum::Router;

use crate::state::SharedState;

/// Checklist routes.
pub mod checklist;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Run progression routes.
pub mod run;
/// Server-Sent Events dashboard endpoint.
pub mod sse;
/// Timer command routes.
pub mod timer;
/// Dashboard WebSocket endpoint.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(timer::router())
        .merge(run::router())
        .merge(checklist::router())
        .merge(docs::router());

    api_router.with_state(state)
}
