use std::{fs, io::ErrorKind, path::Path, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use tokio::sync::RwLock;
use tracing::info;

use crate::dao::{
    models::RunEntity,
    run_catalog::RunCatalog,
    storage::{StorageError, StorageResult},
};

/// Run catalog kept in process memory, seeded once from the runs file.
#[derive(Clone, Default)]
pub struct MemoryRunCatalog {
    runs: Arc<RwLock<Vec<RunEntity>>>,
}

impl MemoryRunCatalog {
    /// Build a catalog from runs in schedule order, assigning missing identifiers.
    pub fn new(runs: Vec<RunEntity>) -> Self {
        Self {
            runs: Arc::new(RwLock::new(assign_ids(runs))),
        }
    }

    /// Import the schedule from a JSON array of runs.
    ///
    /// A missing file yields an empty catalog; a malformed one is an error.
    pub fn from_file(path: &Path) -> StorageResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "runs file not found; starting with an empty schedule");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("reading runs file {}", path.display()),
                    err,
                ));
            }
        };

        let runs = Self::parse(&contents).map_err(|err| {
            StorageError::unavailable(format!("parsing runs file {}", path.display()), err)
        })?;
        info!(path = %path.display(), count = runs.len(), "imported runs");
        Ok(Self::new(runs))
    }

    fn parse(contents: &str) -> serde_json::Result<Vec<RunEntity>> {
        serde_json::from_str(contents)
    }
}

/// Runs without an identifier get one past the highest identifier in the file.
fn assign_ids(mut runs: Vec<RunEntity>) -> Vec<RunEntity> {
    let mut next_id = runs.iter().filter_map(|run| run.id).max().unwrap_or(0) + 1;
    for run in runs.iter_mut().filter(|run| run.id.is_none()) {
        run.id = Some(next_id);
        next_id += 1;
    }
    runs
}

impl RunCatalog for MemoryRunCatalog {
    fn count_runs(&self) -> BoxFuture<'static, StorageResult<usize>> {
        let runs = self.runs.clone();
        async move { Ok(runs.read().await.len()) }.boxed()
    }

    fn run_at(&self, position: usize) -> BoxFuture<'static, StorageResult<Option<RunEntity>>> {
        let runs = self.runs.clone();
        async move { Ok(runs.read().await.get(position).cloned()) }.boxed()
    }

    fn all_runs(&self) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>> {
        let runs = self.runs.clone();
        async move { Ok(runs.read().await.clone()) }.boxed()
    }

    fn save_run(&self, run: RunEntity) -> BoxFuture<'static, StorageResult<()>> {
        let runs = self.runs.clone();
        async move {
            let id = run.id.ok_or(StorageError::UnknownRun(-1))?;
            let mut guard = runs.write().await;
            let slot = guard
                .iter_mut()
                .find(|stored| stored.id == Some(id))
                .ok_or(StorageError::UnknownRun(id))?;
            *slot = run;
            Ok(())
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        async { Ok(()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNS_JSON: &str = r#"[
        {"gameInfo": {"gameName": "Portal", "releaseYear": 2007},
         "runInfo": {"estimate": 900, "category": "Glitchless", "platform": "PC"},
         "players": [{"id": 4, "displayName": "alpha"}]},
        {"runID": 7, "gameInfo": {"gameName": "Celeste"}, "players": []},
        {"gameInfo": {"gameName": "Hades"}}
    ]"#;

    #[tokio::test]
    async fn parses_runs_file_and_assigns_missing_ids() {
        let runs = MemoryRunCatalog::parse(RUNS_JSON).unwrap();
        let catalog = MemoryRunCatalog::new(runs);

        assert_eq!(catalog.count_runs().await.unwrap(), 3);
        let ids: Vec<_> = catalog
            .all_runs()
            .await
            .unwrap()
            .into_iter()
            .map(|run| run.id)
            .collect();
        assert_eq!(ids, vec![Some(8), Some(7), Some(9)]);

        let first = catalog.run_at(0).await.unwrap().unwrap();
        assert_eq!(first.game_info.game_name, "Portal");
        assert_eq!(first.players[0].display_name, "alpha");
        assert!(!first.players[0].timer.finished);
        assert!(catalog.run_at(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_run_replaces_matching_entry() {
        let catalog = MemoryRunCatalog::new(MemoryRunCatalog::parse(RUNS_JSON).unwrap());
        let mut run = catalog.run_at(1).await.unwrap().unwrap();
        run.game_info.game_name = "Celeste Classic".into();
        catalog.save_run(run).await.unwrap();

        let stored = catalog.run_at(1).await.unwrap().unwrap();
        assert_eq!(stored.game_info.game_name, "Celeste Classic");

        let mut unknown = stored.clone();
        unknown.id = Some(99);
        assert!(matches!(
            catalog.save_run(unknown).await,
            Err(StorageError::UnknownRun(99))
        ));
    }

    #[test]
    fn missing_runs_file_yields_empty_catalog() {
        let catalog =
            MemoryRunCatalog::from_file(Path::new("definitely/not/here/runs.json")).unwrap();
        assert!(catalog.runs.try_read().unwrap().is_empty());
    }
}
