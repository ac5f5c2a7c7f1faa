//! Live dashboard core for a speedrun marathon: run timer, run progression and client broadcasts.

/// Runtime configuration loading.
pub mod config;
/// Run catalog storage.
pub mod dao;
/// Wire types for REST responses and dashboard messages.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Live session state.
pub mod state;
