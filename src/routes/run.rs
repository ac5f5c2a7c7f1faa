use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::run::{ActiveRunsResponse, RunsResponse, SwitchRunRequest, UpNextResponse},
    error::AppError,
    services::run_service,
    state::SharedState,
};

/// Run progression endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/run/switch", post(switch_run))
        .route("/run/layout", post(refresh_layout))
        .route("/run/get/active", get(get_active_runs))
        .route("/run/get/all", get(get_all_runs))
}

/// Move to the next or previous run while the timer is stopped.
#[utoipa::path(
    post,
    path = "/run/switch",
    tag = "runs",
    request_body = SwitchRunRequest,
    responses(
        (status = 200, description = "Run switched", body = ActiveRunsResponse),
        (status = 409, description = "Timer not stopped or no run in that direction"),
        (status = 503, description = "Run catalog unavailable")
    )
)]
pub async fn switch_run(
    State(state): State<SharedState>,
    Json(payload): Json<SwitchRunRequest>,
) -> Result<Json<ActiveRunsResponse>, AppError> {
    Ok(Json(
        run_service::switch_run(&state, payload.direction).await?,
    ))
}

/// Announce the current next run on the stream layout.
#[utoipa::path(
    post,
    path = "/run/layout",
    tag = "runs",
    responses((status = 200, description = "Announced next run refreshed", body = UpNextResponse))
)]
pub async fn refresh_layout(State(state): State<SharedState>) -> Json<UpNextResponse> {
    Json(UpNextResponse {
        up_next: run_service::refresh_announced_next(&state).await,
    })
}

/// Previous, current and next runs plus the announced next run.
#[utoipa::path(
    get,
    path = "/run/get/active",
    tag = "runs",
    responses((status = 200, description = "Previous, current, next and announced runs", body = ActiveRunsResponse))
)]
pub async fn get_active_runs(State(state): State<SharedState>) -> Json<ActiveRunsResponse> {
    Json(run_service::active_runs(&state).await)
}

/// Full schedule in order.
#[utoipa::path(
    get,
    path = "/run/get/all",
    tag = "runs",
    responses(
        (status = 200, description = "Every run", body = RunsResponse),
        (status = 503, description = "Run catalog unavailable")
    )
)]
pub async fn get_all_runs(
    State(state): State<SharedState>,
) -> Result<Json<RunsResponse>, AppError> {
    Ok(Json(run_service::list_runs(&state).await?))
}
