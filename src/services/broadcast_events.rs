use std::{sync::Arc, time::Duration};

use tokio::time::Instant;
use tracing::warn;

use crate::{
    dao::models::RunEntity,
    dto::{
        broadcast::DashboardMessage, checklist::ChecklistResponse, run::RunSummary,
        timer::TimerStateDto,
    },
    error::CollaboratorError,
    state::{
        SharedState,
        checklist::Checklist,
        hub::{BroadcastHub, ClientSubscription, Frame},
        progression::RunProgression,
        run::Run,
        timer::TimerPhase,
    },
};

/// Broadcast the running timer's elapsed time.
pub fn broadcast_time(hub: &BroadcastHub, elapsed: Duration) {
    publish(
        hub,
        &DashboardMessage::TimeUpdate {
            t: elapsed.as_secs_f64(),
        },
    );
}

/// Broadcast a timer state change.
pub fn broadcast_state(hub: &BroadcastHub, phase: TimerPhase) {
    publish(
        hub,
        &DashboardMessage::StateUpdate {
            state: phase.into(),
        },
    );
}

/// Broadcast the active (previous, current, next) runs and the announced next run.
pub fn broadcast_active_runs(hub: &BroadcastHub, progression: &RunProgression) {
    let triple = progression.active_triple();
    publish(
        hub,
        &DashboardMessage::RunCurrentUpdate {
            prev_run: (&triple.prev).into(),
            current_run: (&triple.current).into(),
            next_run: (&triple.next).into(),
            up_next: progression.up_next().into(),
            run_index: progression.index(),
        },
    );
}

/// Broadcast the full schedule as stored in the catalog.
pub fn broadcast_runs(hub: &BroadcastHub, runs: Vec<RunEntity>) {
    publish(
        hub,
        &DashboardMessage::RunsOnlyUpdate {
            runs: runs.into_iter().map(RunSummary::from).collect(),
        },
    );
}

/// Broadcast the run announced as coming up.
pub fn broadcast_up_next(hub: &BroadcastHub, up_next: &Run) {
    publish(
        hub,
        &DashboardMessage::UpNextUpdate {
            up_next: up_next.into(),
        },
    );
}

/// Broadcast the checklist.
pub fn broadcast_checklist(hub: &BroadcastHub, checklist: &Checklist) {
    publish(
        hub,
        &DashboardMessage::ChecklistUpdate {
            checklist: checklist.into(),
        },
    );
}

/// Register a dashboard client, handing it a private `initialData` snapshot.
///
/// The snapshot is built and the registration queued while the timer,
/// progression and checklist locks are held, so the client receives exactly
/// the broadcasts emitted after the state it was shown.
pub async fn register_client(state: &SharedState) -> ClientSubscription {
    let _sync = state.catalog_writer().publish_lock().lock().await;
    let runs = match state.catalog().all_runs().await {
        Ok(runs) => runs,
        Err(err) => {
            warn!(
                collaborator = "catalog",
                error = %CollaboratorError::from(err),
                "failed to read runs for initial snapshot"
            );
            Vec::new()
        }
    };

    let timer = state.timer().lock().await;
    let progression = state.progression().lock().await;
    let checklist = state.checklist().lock().await;

    let triple = progression.active_triple();
    let message = DashboardMessage::InitialData {
        runs: runs.into_iter().map(RunSummary::from).collect(),
        prev_run: (&triple.prev).into(),
        current_run: (&triple.current).into(),
        next_run: (&triple.next).into(),
        up_next: progression.up_next().into(),
        run_index: progression.index(),
        timer_state: TimerStateDto::from(timer.phase()),
        t: timer.elapsed_at(Instant::now()).as_secs_f64(),
        checklist: ChecklistResponse::from(&*checklist),
    };
    let initial = encode(&message).unwrap_or_else(|| Arc::from(r#"{"dataType":"initialData"}"#));
    state.hub().register(initial)
}

fn publish(hub: &BroadcastHub, message: &DashboardMessage) {
    if let Some(frame) = encode(message) {
        hub.publish(frame);
    }
}

fn encode(message: &DashboardMessage) -> Option<Frame> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Arc::from(json)),
        Err(err) => {
            warn!(data_type = message.data_type(), error = %err, "failed to serialize dashboard message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::timer_service,
        state::test_support::{data_types, drain, sample_runs, seeded_state},
    };

    #[tokio::test(start_paused = true)]
    async fn late_client_receives_only_current_snapshot() {
        let (state, _) = seeded_state(sample_runs(3)).await;
        let mut early = register_client(&state).await;

        timer_service::start(&state).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        timer_service::pause(&state).await.unwrap();

        let early_frames = drain(&mut early).await;
        assert_eq!(early_frames[0]["dataType"], "initialData");
        assert!(early_frames.len() > 3);

        let mut late = register_client(&state).await;
        let frames = drain(&mut late).await;
        assert_eq!(data_types(&frames), ["initialData"]);

        let snapshot = &frames[0];
        assert_eq!(snapshot["timerState"], "paused");
        assert_eq!(snapshot["t"], 2.0);
        assert_eq!(snapshot["runIndex"], 0);
        assert_eq!(snapshot["prevRun"]["runID"], -1);
        assert_eq!(snapshot["currentRun"]["runID"], 1);
        assert_eq!(snapshot["nextRun"]["runID"], 2);
        assert_eq!(snapshot["upNext"]["runID"], 2);
        assert_eq!(snapshot["runs"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn producer_order_is_preserved_for_every_client() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        let mut first = register_client(&state).await;
        let mut second = register_client(&state).await;

        broadcast_state(state.hub(), TimerPhase::Running);
        broadcast_time(state.hub(), Duration::from_millis(1500));
        broadcast_state(state.hub(), TimerPhase::Paused);

        for client in [&mut first, &mut second] {
            let frames = drain(client).await;
            assert_eq!(
                data_types(&frames),
                ["initialData", "stateUpdate", "timeUpdate", "stateUpdate"]
            );
            assert_eq!(frames[1]["state"], "running");
            assert_eq!(frames[2]["t"], 1.5);
            assert_eq!(frames[3]["state"], "paused");
        }
    }

    #[tokio::test]
    async fn empty_schedule_snapshot_carries_placeholder_notice() {
        let (state, _) = seeded_state(Vec::new()).await;
        let mut client = register_client(&state).await;
        let frames = drain(&mut client).await;

        let current = &frames[0]["currentRun"];
        assert_eq!(current["runID"], -1);
        assert_eq!(current["notice"], state.config().empty_catalog_notice());
        assert_eq!(frames[0]["timerState"], "stopped");
    }
}
