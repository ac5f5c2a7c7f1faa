use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Dashboard clients currently receiving broadcasts.
    pub clients: usize,
    /// Runs in the schedule, when the catalog answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs: Option<usize>,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(clients: usize, runs: usize) -> Self {
        Self {
            status: "ok".to_string(),
            clients,
            runs: Some(runs),
        }
    }

    /// Create a health response indicating the run catalog is unreachable.
    pub fn degraded(clients: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            clients,
            runs: None,
        }
    }
}
