/// Dashboard message construction and client registration.
pub mod broadcast_events;
/// Serial write-back of completion records to the run catalog.
pub mod catalog_sync;
/// Pre-run checklist operations.
pub mod checklist_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Notification collaborator and background delivery.
pub mod notifier;
/// Run progression commands and queries.
pub mod run_service;
/// Server-Sent Events dashboard stream.
pub mod sse_service;
/// Periodic timer tick task.
pub mod ticker;
/// Timer commands.
pub mod timer_service;
/// Dashboard WebSocket connection handling.
pub mod websocket_service;
