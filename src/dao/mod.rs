/// In-memory run catalog seeded from the runs file.
pub mod memory_catalog;
/// Stored run document definitions.
pub mod models;
/// Run catalog abstraction consumed by the progression controller.
pub mod run_catalog;
/// Storage error types shared by catalog implementations.
pub mod storage;
