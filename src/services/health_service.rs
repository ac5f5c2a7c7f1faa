use tracing::warn;

use crate::{dto::health::HealthResponse, error::CollaboratorError, state::SharedState};

/// Report connected clients and the schedule size, degraded when the catalog fails.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let clients = state.hub().client_count();
    let catalog = state.catalog();

    let probe = match catalog.health_check().await {
        Ok(()) => catalog.count_runs().await,
        Err(err) => Err(err),
    };
    match probe {
        Ok(runs) => HealthResponse::ok(clients, runs),
        Err(err) => {
            warn!(collaborator = "catalog", error = %CollaboratorError::from(err), "catalog health check failed");
            HealthResponse::degraded(clients)
        }
    }
}
