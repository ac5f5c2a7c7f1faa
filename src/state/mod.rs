/// Pre-run checklist.
pub mod checklist;
/// Client registry and broadcast dispatch.
pub mod hub;
/// Position in the run schedule.
pub mod progression;
/// Run and participant domain types.
pub mod run;
/// Timer state machine.
pub mod timer;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::AppConfig,
    dao::run_catalog::RunCatalog,
    services::{catalog_sync::CatalogWriter, notifier::Notifier, ticker::Ticker},
    state::{
        checklist::Checklist, hub::BroadcastHub, progression::RunProgression, timer::Timer,
    },
};

/// Handle shared by every route and background task.
pub type SharedState = Arc<AppState>;

/// Process-wide live session: timer, run progression, checklist and the client hub.
///
/// Locks are always taken in the order command gate, timer, progression.
pub struct AppState {
    config: AppConfig,
    catalog: Arc<dyn RunCatalog>,
    hub: BroadcastHub,
    timer: Arc<Mutex<Timer>>,
    progression: Mutex<RunProgression>,
    checklist: Mutex<Checklist>,
    notifier: Arc<dyn Notifier>,
    catalog_writer: CatalogWriter,
    command_gate: Mutex<Option<Ticker>>,
}

impl AppState {
    /// Build the shared state and spawn the hub dispatcher and catalog writer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn RunCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> SharedState {
        let (hub, dispatcher) = BroadcastHub::new(config.client_buffer());
        tokio::spawn(dispatcher.run());
        let catalog_writer = CatalogWriter::spawn(catalog.clone(), hub.clone());

        Arc::new(Self {
            hub,
            timer: Arc::new(Mutex::new(Timer::new())),
            progression: Mutex::new(RunProgression::new(config.empty_catalog_notice())),
            checklist: Mutex::new(Checklist::new(config.checklist().iter().cloned())),
            catalog,
            notifier,
            catalog_writer,
            command_gate: Mutex::new(None),
            config,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run catalog the schedule is read from.
    pub fn catalog(&self) -> &Arc<dyn RunCatalog> {
        &self.catalog
    }

    /// Fan-out hub for dashboard clients.
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Run timer. Commands must hold the command gate first.
    pub fn timer(&self) -> &Mutex<Timer> {
        &self.timer
    }

    /// Schedule position and active runs.
    pub fn progression(&self) -> &Mutex<RunProgression> {
        &self.progression
    }

    /// Pre-run checklist.
    pub fn checklist(&self) -> &Mutex<Checklist> {
        &self.checklist
    }

    /// Notification collaborator.
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    /// Serial writer for completion records.
    pub fn catalog_writer(&self) -> &CatalogWriter {
        &self.catalog_writer
    }

    /// Serialises commands; holds the tick task while the timer runs.
    pub fn command_gate(&self) -> &Mutex<Option<Ticker>> {
        &self.command_gate
    }

    /// Spawn a tick task bound to this state's timer and hub.
    pub fn spawn_ticker(&self) -> Ticker {
        Ticker::spawn(
            self.timer.clone(),
            self.hub.clone(),
            self.config.tick_interval(),
        )
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::{Arc, Mutex as StdMutex};

    use futures::{FutureExt, future::BoxFuture};
    use serde_json::Value;

    use crate::{
        config::AppConfig,
        dao::{
            memory_catalog::MemoryRunCatalog,
            models::{GameInfoEntity, ParticipantEntity, RunEntity},
        },
        dto::run::RunSummary,
        services::{
            notifier::{NotifyError, Notifier},
            run_service,
        },
        state::{SharedState, hub::ClientSubscription},
    };

    /// What a [`RecordingNotifier`] was asked to send.
    #[derive(Debug, Clone)]
    pub enum Recorded {
        RunChanged(RunSummary),
        ChecklistCompleted,
    }

    /// Notifier that keeps every signal in memory, optionally failing each one.
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: StdMutex<Vec<Recorded>>,
        fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<Recorded> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, entry: Recorded) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.sent.lock().unwrap().push(entry);
            let fail = self.fail;
            async move {
                if fail {
                    Err(NotifyError::Status(500))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    impl Notifier for RecordingNotifier {
        fn run_changed(&self, run: RunSummary) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.record(Recorded::RunChanged(run))
        }

        fn checklist_completed(&self) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.record(Recorded::ChecklistCompleted)
        }
    }

    /// `count` runs with two participants each, identifiers `1..=count`.
    pub fn sample_runs(count: usize) -> Vec<RunEntity> {
        (1..=count as i64)
            .map(|id| RunEntity {
                id: Some(id),
                game_info: GameInfoEntity {
                    game_name: format!("Game {id}"),
                    release_year: 2000 + id as i32,
                },
                run_info: Default::default(),
                players: (0..2)
                    .map(|p| ParticipantEntity {
                        id: id * 10 + p,
                        display_name: format!("runner-{id}-{p}"),
                        ..Default::default()
                    })
                    .collect(),
            })
            .collect()
    }

    /// State over an in-memory catalog of `runs`, with the progression loaded.
    pub async fn seeded_state(runs: Vec<RunEntity>) -> (SharedState, Arc<RecordingNotifier>) {
        seeded_state_with(AppConfig::default(), runs, RecordingNotifier::default()).await
    }

    pub async fn seeded_state_with(
        config: AppConfig,
        runs: Vec<RunEntity>,
        notifier: RecordingNotifier,
    ) -> (SharedState, Arc<RecordingNotifier>) {
        let notifier = Arc::new(notifier);
        let state = super::AppState::new(
            config,
            Arc::new(MemoryRunCatalog::new(runs)),
            notifier.clone(),
        );
        run_service::load_active_runs(&state).await.unwrap();
        (state, notifier)
    }

    /// Let spawned tasks drain their queues.
    pub async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    /// Every frame already buffered for `client`, parsed as JSON.
    pub async fn drain(client: &mut ClientSubscription) -> Vec<Value> {
        settle().await;
        let mut frames = Vec::new();
        while let Some(frame) = client.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// `dataType` of each frame.
    pub fn data_types(frames: &[Value]) -> Vec<String> {
        frames
            .iter()
            .map(|frame| frame["dataType"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}
