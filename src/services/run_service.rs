use std::sync::Arc;

use tracing::info;

use crate::{
    dao::run_catalog::RunCatalog,
    dto::run::{ActiveRunsResponse, RunSummary, RunsResponse},
    error::ServiceError,
    services::{
        broadcast_events, checklist_service,
        notifier::{Notification, notify_in_background},
    },
    state::{
        SharedState,
        progression::{ActiveTriple, Direction},
        run::Run,
        timer::Command,
    },
};

/// Runs at `index - 1`, `index` and `index + 1`, as available.
type Window = (Option<Run>, Option<Run>, Option<Run>);

/// Load the active pointers at the configured start position.
///
/// The announced-next run starts out equal to `next`.
pub async fn load_active_runs(state: &SharedState) -> Result<ActiveRunsResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    let count = state.catalog().count_runs().await?;
    let index = state
        .config()
        .initial_run_index()
        .min(count.saturating_sub(1));
    let (prev, current, next) = read_window(state.catalog(), index).await?;

    let mut progression = state.progression().lock().await;
    progression.apply(index, prev, current, next);
    progression.refresh_announced_next();
    info!(index = progression.index(), runs = count, "active runs loaded");
    Ok(ActiveRunsResponse::from(&*progression))
}

/// Move to the next or previous run. Only allowed while the timer is stopped.
///
/// The checklist is reset and a "run changed" notification sent, both in the
/// background.
pub async fn switch_run(
    state: &SharedState,
    direction: Direction,
) -> Result<ActiveRunsResponse, ServiceError> {
    let _gate = state.command_gate().lock().await;
    state.timer().lock().await.ensure(Command::SwitchRun)?;

    let count = state.catalog().count_runs().await?;
    let target = state
        .progression()
        .lock()
        .await
        .target_index(direction, count)?;
    let (prev, current, next) = read_window(state.catalog(), target).await?;

    let response = {
        let mut progression = state.progression().lock().await;
        progression.apply(target, prev, current, next);
        broadcast_events::broadcast_active_runs(state.hub(), &progression);
        ActiveRunsResponse::from(&*progression)
    };
    info!(%direction, index = target, run = response.current_run.id, "switched run");

    checklist_service::reset_in_background(state.clone());
    notify_in_background(
        state.notifier(),
        Notification::RunChanged(response.current_run.clone()),
    );
    Ok(response)
}

/// Copy `next` into the announced-next slot and broadcast it.
pub async fn refresh_announced_next(state: &SharedState) -> RunSummary {
    let _gate = state.command_gate().lock().await;
    let mut progression = state.progression().lock().await;
    let up_next = progression.refresh_announced_next();
    broadcast_events::broadcast_up_next(state.hub(), up_next);
    info!(run = up_next.id, "announced next run refreshed");
    RunSummary::from(up_next)
}

/// Read-only copy of the (previous, current, next) runs.
pub async fn active_triple(state: &SharedState) -> ActiveTriple {
    state.progression().lock().await.active_triple()
}

/// Active runs together with the announced-next run and position.
pub async fn active_runs(state: &SharedState) -> ActiveRunsResponse {
    ActiveRunsResponse::from(&*state.progression().lock().await)
}

/// The whole schedule as stored in the catalog.
pub async fn list_runs(state: &SharedState) -> Result<RunsResponse, ServiceError> {
    let runs = state.catalog().all_runs().await?;
    Ok(RunsResponse {
        runs: runs.into_iter().map(RunSummary::from).collect(),
    })
}

async fn read_window(catalog: &Arc<dyn RunCatalog>, index: usize) -> Result<Window, ServiceError> {
    let prev = match index.checked_sub(1) {
        Some(position) => catalog.run_at(position).await?,
        None => None,
    };
    let current = catalog.run_at(index).await?;
    let next = catalog.run_at(index + 1).await?;
    Ok((
        prev.map(Run::from),
        current.map(Run::from),
        next.map(Run::from),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        services::timer_service,
        state::{
            progression::BoundaryError,
            test_support::{
                Recorded, RecordingNotifier, data_types, drain, sample_runs, seeded_state,
                seeded_state_with, settle,
            },
        },
    };

    #[tokio::test]
    async fn switching_walks_the_schedule_within_bounds() {
        let (state, _) = seeded_state(sample_runs(3)).await;

        assert!(matches!(
            switch_run(&state, Direction::Previous).await,
            Err(ServiceError::Boundary(BoundaryError(Direction::Previous)))
        ));

        let second = switch_run(&state, Direction::Next).await.unwrap();
        assert_eq!(second.run_index, 1);
        assert_eq!(
            (second.prev_run.id, second.current_run.id, second.next_run.id),
            (1, 2, 3)
        );

        let last = switch_run(&state, Direction::Next).await.unwrap();
        assert_eq!(last.next_run.id, -1);
        let err = switch_run(&state, Direction::Next).await.unwrap_err();
        assert_eq!(err.to_string(), "no next run");

        let triple = active_triple(&state).await;
        assert_eq!(triple.current.id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_is_rejected_unless_stopped() {
        let (state, _) = seeded_state(sample_runs(3)).await;
        timer_service::start(&state).await.unwrap();
        let before = active_triple(&state).await;

        for direction in [Direction::Next, Direction::Previous] {
            assert!(matches!(
                switch_run(&state, direction).await,
                Err(ServiceError::InvalidStateTransition(_))
            ));
        }
        timer_service::pause(&state).await.unwrap();
        assert!(switch_run(&state, Direction::Next).await.is_err());

        assert_eq!(active_triple(&state).await, before);
    }

    #[tokio::test]
    async fn switch_resets_checklist_and_notifies() {
        let config = AppConfig::default();
        let (state, notifier) =
            seeded_state_with(config, sample_runs(2), RecordingNotifier::default()).await;
        state.checklist().lock().await.add("mic check".into());
        state.checklist().lock().await.toggle("mic check");
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        switch_run(&state, Direction::Next).await.unwrap();
        settle().await;

        assert!(state.checklist().lock().await.items().values().all(|done| !done));
        assert!(matches!(&notifier.sent()[..], [Recorded::RunChanged(run)] if run.id == 2));
        let frames = drain(&mut client).await;
        assert_eq!(data_types(&frames), ["runCurrentUpdate", "checklistUpdate"]);
        assert_eq!(frames[0]["currentRun"]["runID"], 2);
        assert_eq!(frames[0]["runIndex"], 1);
        assert_eq!(frames[0]["upNext"]["runID"], 2);
    }

    #[tokio::test]
    async fn failing_notifier_does_not_fail_switch() {
        let (state, notifier) = seeded_state_with(
            AppConfig::default(),
            sample_runs(2),
            RecordingNotifier::failing(),
        )
        .await;
        assert!(switch_run(&state, Direction::Next).await.is_ok());
        settle().await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn announced_next_only_moves_on_refresh() {
        let (state, _) = seeded_state(sample_runs(3)).await;
        assert_eq!(active_runs(&state).await.up_next.id, 2);

        switch_run(&state, Direction::Next).await.unwrap();
        let runs = active_runs(&state).await;
        assert_eq!(runs.next_run.id, 3);
        assert_eq!(runs.up_next.id, 2);

        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;
        assert_eq!(refresh_announced_next(&state).await.id, 3);
        let frames = drain(&mut client).await;
        assert_eq!(data_types(&frames), ["upNextUpdate"]);
        assert_eq!(frames[0]["upNext"]["runID"], 3);
    }

    #[tokio::test]
    async fn empty_schedule_never_panics() {
        let (state, _) = seeded_state(Vec::new()).await;
        let runs = active_runs(&state).await;
        assert_eq!(runs.run_index, 0);
        assert!(runs.current_run.notice.is_some());
        assert!(matches!(
            switch_run(&state, Direction::Next).await,
            Err(ServiceError::Boundary(_))
        ));
        assert_eq!(refresh_announced_next(&state).await.id, -1);
        assert!(list_runs(&state).await.unwrap().runs.is_empty());
    }

    #[tokio::test]
    async fn initial_index_is_clamped_to_schedule() {
        let config = AppConfig::default().with_initial_run_index(9);
        let (state, _) =
            seeded_state_with(config, sample_runs(2), RecordingNotifier::default()).await;
        let runs = active_runs(&state).await;
        assert_eq!(runs.run_index, 1);
        assert_eq!(runs.current_run.id, 2);
        assert_eq!(runs.up_next.id, -1);
    }
}
