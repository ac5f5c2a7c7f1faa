/// Messages pushed to dashboard clients.
pub mod broadcast;
/// Checklist requests and responses.
pub mod checklist;
/// Health check response.
pub mod health;
/// Run summaries and progression payloads.
pub mod run;
/// Timer state payloads.
pub mod timer;
/// Custom validators.
pub mod validation;
