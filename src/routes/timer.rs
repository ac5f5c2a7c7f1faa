use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::timer::TimerSnapshotResponse, error::AppError, services::timer_service,
    state::SharedState,
};

/// Timer command and query endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/timer", get(get_timer))
        .route("/timer/start", post(start_timer))
        .route("/timer/pause", post(pause_timer))
        .route("/timer/resume", post(resume_timer))
        .route("/timer/finish", post(finish_timer))
        .route("/timer/reset", post(reset_timer))
        .route("/timer/player/finish/{index}", post(player_finish))
}

/// Current timer state and elapsed seconds.
#[utoipa::path(
    get,
    path = "/timer",
    tag = "timer",
    responses((status = 200, description = "Timer snapshot", body = TimerSnapshotResponse))
)]
pub async fn get_timer(State(state): State<SharedState>) -> Json<TimerSnapshotResponse> {
    Json(timer_service::snapshot(&state).await.into())
}

/// Start the timer from zero.
#[utoipa::path(
    post,
    path = "/timer/start",
    tag = "timer",
    responses(
        (status = 200, description = "Timer running", body = TimerSnapshotResponse),
        (status = 409, description = "Timer is not stopped")
    )
)]
pub async fn start_timer(
    State(state): State<SharedState>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::start(&state).await?.into()))
}

/// Freeze the running timer.
#[utoipa::path(
    post,
    path = "/timer/pause",
    tag = "timer",
    responses(
        (status = 200, description = "Timer paused", body = TimerSnapshotResponse),
        (status = 409, description = "Timer is not running")
    )
)]
pub async fn pause_timer(
    State(state): State<SharedState>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::pause(&state).await?.into()))
}

/// Continue after a pause, or restart a finished run from zero.
#[utoipa::path(
    post,
    path = "/timer/resume",
    tag = "timer",
    responses(
        (status = 200, description = "Timer running", body = TimerSnapshotResponse),
        (status = 409, description = "Timer is neither paused nor finished")
    )
)]
pub async fn resume_timer(
    State(state): State<SharedState>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::resume(&state).await?.into()))
}

/// Finish the run; participants still running get the current elapsed time.
#[utoipa::path(
    post,
    path = "/timer/finish",
    tag = "timer",
    responses(
        (status = 200, description = "Timer finished", body = TimerSnapshotResponse),
        (status = 409, description = "Timer is not running")
    )
)]
pub async fn finish_timer(
    State(state): State<SharedState>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::finish(&state).await?.into()))
}

/// Back to zero; completion records of the current run are cleared.
#[utoipa::path(
    post,
    path = "/timer/reset",
    tag = "timer",
    responses(
        (status = 200, description = "Timer stopped and cleared", body = TimerSnapshotResponse),
        (status = 409, description = "Timer is neither paused nor finished")
    )
)]
pub async fn reset_timer(
    State(state): State<SharedState>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::reset(&state).await?.into()))
}

/// Record a finish for one participant of the current run.
#[utoipa::path(
    post,
    path = "/timer/player/finish/{index}",
    tag = "timer",
    params(("index" = usize, Path, description = "Position of the participant in the current run")),
    responses(
        (status = 200, description = "Participant finished", body = TimerSnapshotResponse),
        (status = 404, description = "No such participant"),
        (status = 409, description = "Timer is not running or participant already finished")
    )
)]
pub async fn player_finish(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<TimerSnapshotResponse>, AppError> {
    Ok(Json(timer_service::player_finish(&state, index).await?.into()))
}
