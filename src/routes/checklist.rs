use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use validator::Validate;

use crate::{
    dto::checklist::{ChecklistDoneResponse, ChecklistItemRequest, ChecklistResponse},
    error::AppError,
    services::checklist_service,
    state::SharedState,
};

/// Pre-run checklist endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/checklist", get(get_checklist).post(add_item))
        .route("/checklist/toggle", put(toggle_item))
        .route("/checklist/done", get(checklist_done))
        .route("/checklist/{item}", delete(delete_item))
}

/// Items in display order with the completion flag.
#[utoipa::path(
    get,
    path = "/checklist",
    tag = "checklist",
    responses((status = 200, description = "Checklist items", body = ChecklistResponse))
)]
pub async fn get_checklist(State(state): State<SharedState>) -> Json<ChecklistResponse> {
    Json(checklist_service::list(&state).await)
}

/// Add a pending item.
#[utoipa::path(
    post,
    path = "/checklist",
    tag = "checklist",
    request_body = ChecklistItemRequest,
    responses(
        (status = 200, description = "Item added", body = ChecklistResponse),
        (status = 400, description = "Invalid or duplicate item")
    )
)]
pub async fn add_item(
    State(state): State<SharedState>,
    Json(payload): Json<ChecklistItemRequest>,
) -> Result<Json<ChecklistResponse>, AppError> {
    payload.validate()?;
    Ok(Json(checklist_service::add(&state, payload.item).await?))
}

/// Flip an item between pending and done.
#[utoipa::path(
    put,
    path = "/checklist/toggle",
    tag = "checklist",
    request_body = ChecklistItemRequest,
    responses(
        (status = 200, description = "Item toggled", body = ChecklistResponse),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn toggle_item(
    State(state): State<SharedState>,
    Json(payload): Json<ChecklistItemRequest>,
) -> Result<Json<ChecklistResponse>, AppError> {
    payload.validate()?;
    Ok(Json(checklist_service::toggle(&state, &payload.item).await?))
}

/// Remove an item.
#[utoipa::path(
    delete,
    path = "/checklist/{item}",
    tag = "checklist",
    params(("item" = String, Path, description = "Item to remove")),
    responses(
        (status = 200, description = "Item removed", body = ChecklistResponse),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn delete_item(
    State(state): State<SharedState>,
    Path(item): Path<String>,
) -> Result<Json<ChecklistResponse>, AppError> {
    Ok(Json(checklist_service::remove(&state, &item).await?))
}

/// Whether every item is done.
#[utoipa::path(
    get,
    path = "/checklist/done",
    tag = "checklist",
    responses((status = 200, description = "Completion flag", body = ChecklistDoneResponse))
)]
pub async fn checklist_done(State(state): State<SharedState>) -> Json<ChecklistDoneResponse> {
    Json(ChecklistDoneResponse {
        done: checklist_service::is_done(&state).await,
    })
}
