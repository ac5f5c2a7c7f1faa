use futures::future::BoxFuture;

use crate::dao::{models::RunEntity, storage::StorageResult};

/// Ordered collection of runs owned outside the live core.
///
/// The core only reads runs by schedule position and writes completion
/// records of the current run back.
pub trait RunCatalog: Send + Sync {
    /// Number of runs in the schedule.
    fn count_runs(&self) -> BoxFuture<'static, StorageResult<usize>>;
    /// Run at schedule `position`, `None` when out of range.
    fn run_at(&self, position: usize) -> BoxFuture<'static, StorageResult<Option<RunEntity>>>;
    /// Every run in schedule order.
    fn all_runs(&self) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>>;
    /// Replace the stored copy of a run, matched by identifier.
    fn save_run(&self, run: RunEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe used by the health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
