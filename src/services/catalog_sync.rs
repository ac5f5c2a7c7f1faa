use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::{
    dao::{models::RunEntity, run_catalog::RunCatalog},
    error::CollaboratorError,
    services::broadcast_events,
    state::hub::BroadcastHub,
};

/// Handle to the task writing completion records back to the catalog.
///
/// Writes are applied one at a time in the order they were queued; each
/// successful write is followed by a `runsOnlyUpdate` broadcast.
#[derive(Clone)]
pub struct CatalogWriter {
    tx: mpsc::UnboundedSender<RunEntity>,
    publish_lock: Arc<Mutex<()>>,
}

impl CatalogWriter {
    /// Spawn the writer task.
    pub fn spawn(catalog: Arc<dyn RunCatalog>, hub: BroadcastHub) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let publish_lock = Arc::new(Mutex::new(()));
        tokio::spawn(run_writer(rx, catalog, hub, publish_lock.clone()));
        Self { tx, publish_lock }
    }

    /// Queue a write of `run`. Never blocks.
    pub fn enqueue(&self, run: RunEntity) {
        if self.tx.send(run).is_err() {
            warn!("catalog writer stopped; completion records not persisted");
        }
    }

    /// Held by the writer between a save and its broadcast.
    ///
    /// Client registration takes it while reading the run list so a new
    /// client either sees a write in its snapshot or receives its broadcast.
    pub fn publish_lock(&self) -> &Mutex<()> {
        &self.publish_lock
    }
}

async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<RunEntity>,
    catalog: Arc<dyn RunCatalog>,
    hub: BroadcastHub,
    publish_lock: Arc<Mutex<()>>,
) {
    while let Some(run) = rx.recv().await {
        let run_id = run.id;
        let _guard = publish_lock.lock().await;
        if let Err(err) = catalog.save_run(run).await {
            warn!(
                collaborator = "catalog",
                run = ?run_id,
                error = %CollaboratorError::from(err),
                "failed to write completion records"
            );
            continue;
        }
        match catalog.all_runs().await {
            Ok(runs) => broadcast_events::broadcast_runs(&hub, runs),
            Err(err) => warn!(
                collaborator = "catalog",
                error = %CollaboratorError::from(err),
                "failed to reload runs after write"
            ),
        }
        debug!(run = ?run_id, "completion records written");
    }
}
