use utoipa::OpenApi;

/// Aggregated OpenAPI document for the marathon live dashboard.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::dashboard_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::timer::get_timer,
        crate::routes::timer::start_timer,
        crate::routes::timer::pause_timer,
        crate::routes::timer::resume_timer,
        crate::routes::timer::finish_timer,
        crate::routes::timer::reset_timer,
        crate::routes::timer::player_finish,
        crate::routes::run::switch_run,
        crate::routes::run::refresh_layout,
        crate::routes::run::get_active_runs,
        crate::routes::run::get_all_runs,
        crate::routes::checklist::get_checklist,
        crate::routes::checklist::add_item,
        crate::routes::checklist::toggle_item,
        crate::routes::checklist::delete_item,
        crate::routes::checklist::checklist_done,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::timer::TimerSnapshotResponse,
            crate::dto::timer::TimerStateDto,
            crate::dto::run::RunSummary,
            crate::dto::run::ActiveRunsResponse,
            crate::dto::run::RunsResponse,
            crate::dto::run::SwitchRunRequest,
            crate::dto::run::UpNextResponse,
            crate::dto::checklist::ChecklistResponse,
            crate::dto::checklist::ChecklistItemRequest,
            crate::dto::checklist::ChecklistDoneResponse,
            crate::dto::broadcast::DashboardMessage,
            crate::state::progression::Direction,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "timer", description = "Run timer commands and queries"),
        (name = "runs", description = "Run progression and schedule"),
        (name = "checklist", description = "Pre-run checklist"),
        (name = "dashboard", description = "Live dashboard streams (WebSocket and SSE)"),
    )
)]
pub struct ApiDoc;
