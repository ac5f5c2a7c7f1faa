//! Timer commands: validation, tick task lifecycle, completion records and broadcasts.
//!
//! Every command holds the command gate for its whole duration. The tick task
//! is stopped and joined before the timer lock is taken for any transition
//! leaving `Running`.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    dao::models::RunEntity,
    error::ServiceError,
    services::{broadcast_events, ticker::Ticker},
    state::{
        SharedState,
        progression::RunProgression,
        timer::{Command, InvalidStateTransition, ResumeKind, TimerSnapshot},
    },
};

/// Current timer state with elapsed time as of now.
pub async fn snapshot(state: &SharedState) -> TimerSnapshot {
    let timer = state.timer().lock().await;
    TimerSnapshot {
        phase: timer.phase(),
        elapsed: timer.elapsed_at(Instant::now()),
    }
}

/// Stopped → Running. Completion records left on the current run are cleared.
pub async fn start(state: &SharedState) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    let snapshot = {
        let mut timer = state.timer().lock().await;
        timer.start(Instant::now()).map_err(rejected)?;
        let mut progression = state.progression().lock().await;
        if progression.current().has_completion() {
            progression.current_mut().clear_completion();
            persist_current(state, &progression);
            broadcast_events::broadcast_active_runs(state.hub(), &progression);
        }
        broadcast_events::broadcast_state(state.hub(), timer.phase());
        timer.snapshot()
    };
    replace_ticker(&mut gate, Some(state.spawn_ticker())).await;
    info!("timer started");
    Ok(snapshot)
}

/// Running → Paused.
pub async fn pause(state: &SharedState) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    ensure(state, Command::Pause).await?;
    replace_ticker(&mut gate, None).await;

    let mut timer = state.timer().lock().await;
    timer.pause(Instant::now())?;
    broadcast_events::broadcast_state(state.hub(), timer.phase());
    broadcast_events::broadcast_time(state.hub(), timer.elapsed());
    info!(elapsed_ms = timer.elapsed().as_millis() as u64, "timer paused");
    Ok(timer.snapshot())
}

/// Paused → Running, or Finished → Running as a full restart.
pub async fn resume(state: &SharedState) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    let snapshot = {
        let mut timer = state.timer().lock().await;
        let kind = timer.resume(Instant::now()).map_err(rejected)?;
        if kind == ResumeKind::Restarted {
            let mut progression = state.progression().lock().await;
            progression.current_mut().clear_completion();
            persist_current(state, &progression);
            broadcast_events::broadcast_time(state.hub(), Duration::ZERO);
            broadcast_events::broadcast_active_runs(state.hub(), &progression);
        }
        broadcast_events::broadcast_state(state.hub(), timer.phase());
        info!(?kind, "timer resumed");
        timer.snapshot()
    };
    replace_ticker(&mut gate, Some(state.spawn_ticker())).await;
    Ok(snapshot)
}

/// Running → Finished; participants still running get the final elapsed time.
pub async fn finish(state: &SharedState) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    ensure(state, Command::Finish).await?;
    replace_ticker(&mut gate, None).await;

    let mut timer = state.timer().lock().await;
    let mut progression = state.progression().lock().await;
    let elapsed = timer.finish(Instant::now())?;
    progression.current_mut().finish_remaining(elapsed);
    persist_current(state, &progression);
    broadcast_events::broadcast_time(state.hub(), elapsed);
    broadcast_events::broadcast_active_runs(state.hub(), &progression);
    broadcast_events::broadcast_state(state.hub(), timer.phase());
    info!(elapsed_ms = elapsed.as_millis() as u64, "timer finished");
    Ok(timer.snapshot())
}

/// Paused/Finished → Stopped; elapsed and every completion record cleared.
pub async fn reset(state: &SharedState) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    ensure(state, Command::Reset).await?;
    replace_ticker(&mut gate, None).await;

    let mut timer = state.timer().lock().await;
    let mut progression = state.progression().lock().await;
    timer.reset()?;
    progression.current_mut().clear_completion();
    persist_current(state, &progression);
    broadcast_events::broadcast_time(state.hub(), Duration::ZERO);
    broadcast_events::broadcast_active_runs(state.hub(), &progression);
    broadcast_events::broadcast_state(state.hub(), timer.phase());
    info!("timer reset");
    Ok(timer.snapshot())
}

/// Record a finish for participant `index` of the current run.
///
/// Finishing the last running participant finishes the timer as well.
pub async fn player_finish(state: &SharedState, index: usize) -> Result<TimerSnapshot, ServiceError> {
    let mut gate = state.command_gate().lock().await;
    let completes_run = {
        let timer = state.timer().lock().await;
        timer.ensure(Command::PlayerFinish).map_err(rejected)?;
        let progression = state.progression().lock().await;
        let run = progression.current();
        run.check_finishable(index).inspect_err(|err| {
            debug!(index, error = %err, "player finish rejected");
        })?;
        run.remaining_after(index) == 0
    };
    if completes_run {
        replace_ticker(&mut gate, None).await;
    }

    let mut timer = state.timer().lock().await;
    let mut progression = state.progression().lock().await;
    let now = Instant::now();
    let elapsed = timer.elapsed_at(now);
    progression.current_mut().finish_participant(index, elapsed)?;
    if completes_run {
        timer.finish(now)?;
        progression.current_mut().finish_remaining(elapsed);
    }
    persist_current(state, &progression);
    broadcast_events::broadcast_active_runs(state.hub(), &progression);
    if completes_run {
        broadcast_events::broadcast_time(state.hub(), elapsed);
        broadcast_events::broadcast_state(state.hub(), timer.phase());
    }
    info!(
        index,
        elapsed_ms = elapsed.as_millis() as u64,
        run_finished = completes_run,
        "participant finished"
    );
    Ok(timer.snapshot())
}

async fn ensure(state: &SharedState, command: Command) -> Result<(), ServiceError> {
    state
        .timer()
        .lock()
        .await
        .ensure(command)
        .map_err(rejected)
}

fn rejected(err: InvalidStateTransition) -> ServiceError {
    debug!(command = %err.command, state = %err.from, "timer command rejected");
    err.into()
}

/// Stop the current tick task, if any, and install `next`.
async fn replace_ticker(slot: &mut Option<Ticker>, next: Option<Ticker>) {
    if let Some(ticker) = slot.take() {
        ticker.stop().await;
    }
    *slot = next;
}

fn persist_current(state: &SharedState, progression: &RunProgression) {
    let run = progression.current();
    if run.is_empty_run() {
        return;
    }
    state.catalog_writer().enqueue(RunEntity::from(run.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::CompletionEntity,
        state::{
            test_support::{
                RecordingNotifier, data_types, drain, sample_runs, seeded_state,
                seeded_state_with, settle,
            },
            timer::TimerPhase,
        },
    };

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    async fn advance(duration: Duration) {
        tokio::time::advance(duration).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn pause_interval_is_excluded_from_elapsed() {
        let (state, _) = seeded_state(sample_runs(1)).await;

        start(&state).await.unwrap();
        advance(secs(5)).await;
        assert_eq!(pause(&state).await.unwrap().elapsed, secs(5));
        advance(secs(3)).await;
        resume(&state).await.unwrap();
        advance(secs(4)).await;

        let finished = finish(&state).await.unwrap();
        assert_eq!(finished.phase, TimerPhase::Finished);
        assert_eq!(finished.elapsed, secs(9));

        let progression = state.progression().lock().await;
        assert!(
            progression
                .current()
                .players
                .iter()
                .all(|p| p.completion.finished && p.completion.time == secs(9))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn last_player_finish_finishes_the_run() {
        let (state, _) = seeded_state(sample_runs(2)).await;
        start(&state).await.unwrap();

        advance(secs(3)).await;
        let after_first = player_finish(&state, 0).await.unwrap();
        assert_eq!(after_first.phase, TimerPhase::Running);

        advance(secs(2)).await;
        let after_second = player_finish(&state, 1).await.unwrap();
        assert_eq!(after_second.phase, TimerPhase::Finished);
        assert_eq!(after_second.elapsed, secs(5));

        {
            let progression = state.progression().lock().await;
            let times: Vec<_> = progression
                .current()
                .players
                .iter()
                .map(|p| p.completion.time)
                .collect();
            assert_eq!(times, vec![secs(3), secs(5)]);
        }

        settle().await;
        let stored = state.catalog().run_at(0).await.unwrap().unwrap();
        assert!(stored.players.iter().all(|p| p.timer.finished));
        assert_eq!(stored.players[1].timer.time, 5.0);

        advance(secs(10)).await;
        assert_eq!(snapshot(&state).await.elapsed, secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn start_discards_stored_completion_records() {
        let mut runs = sample_runs(1);
        runs[0].players[0].timer = CompletionEntity {
            finished: true,
            time: 42.0,
        };
        let (state, _) = seeded_state(runs).await;
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        start(&state).await.unwrap();
        let frames = drain(&mut client).await;
        assert_eq!(data_types(&frames)[..2], ["runCurrentUpdate", "stateUpdate"]);
        assert_eq!(frames[0]["currentRun"]["players"][0]["timer"]["finished"], false);
        let stored = state.catalog().run_at(0).await.unwrap().unwrap();
        assert!(!stored.players[0].timer.finished);

        advance(secs(3)).await;
        let after_first = player_finish(&state, 0).await.unwrap();
        assert_eq!(after_first.phase, TimerPhase::Running);
        advance(secs(2)).await;
        player_finish(&state, 1).await.unwrap();

        let progression = state.progression().lock().await;
        let times: Vec<_> = progression
            .current()
            .players
            .iter()
            .map(|p| p.completion.time)
            .collect();
        assert_eq!(times, vec![secs(3), secs(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_without_records_broadcasts_state_only() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        start(&state).await.unwrap();
        assert_eq!(data_types(&drain(&mut client).await), ["stateUpdate"]);
    }

    #[tokio::test(start_paused = true)]
    async fn player_finish_rejections_do_not_mutate() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        assert!(matches!(
            player_finish(&state, 0).await,
            Err(ServiceError::InvalidStateTransition(_))
        ));

        start(&state).await.unwrap();
        assert!(matches!(
            player_finish(&state, 7).await,
            Err(ServiceError::Participant(_))
        ));
        player_finish(&state, 0).await.unwrap();
        assert!(matches!(
            player_finish(&state, 0).await,
            Err(ServiceError::Participant(_))
        ));
        assert_eq!(snapshot(&state).await.phase, TimerPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_elapsed_and_completion() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        start(&state).await.unwrap();
        advance(secs(4)).await;
        finish(&state).await.unwrap();

        let stopped = reset(&state).await.unwrap();
        assert_eq!(stopped.phase, TimerPhase::Stopped);
        assert_eq!(stopped.elapsed, Duration::ZERO);
        let progression = state.progression().lock().await;
        assert!(progression.current().players.iter().all(|p| {
            !p.completion.finished && p.completion.time == Duration::ZERO
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_after_finish_restarts_the_run() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        start(&state).await.unwrap();
        advance(secs(6)).await;
        finish(&state).await.unwrap();

        let restarted = resume(&state).await.unwrap();
        assert_eq!(restarted.phase, TimerPhase::Running);
        assert_eq!(restarted.elapsed, Duration::ZERO);
        assert!(
            state
                .progression()
                .lock()
                .await
                .current()
                .players
                .iter()
                .all(|p| !p.completion.finished)
        );

        advance(secs(2)).await;
        assert_eq!(snapshot(&state).await.elapsed, secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_commands_are_rejected_without_broadcast() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        for _ in 0..3 {
            let err = finish(&state).await.unwrap_err();
            assert_eq!(err.to_string(), "finish not allowed while state is Stopped");
            assert!(pause(&state).await.is_err());
            assert!(resume(&state).await.is_err());
            assert!(reset(&state).await.is_err());
        }

        assert!(drain(&mut client).await.is_empty());
        assert_eq!(snapshot(&state).await.phase, TimerPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_lands_after_pause() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        let mut client = broadcast_events::register_client(&state).await;

        start(&state).await.unwrap();
        advance(Duration::from_millis(250)).await;
        pause(&state).await.unwrap();
        advance(secs(2)).await;

        let frames = drain(&mut client).await;
        let last_state = frames
            .iter()
            .rposition(|frame| frame["dataType"] == "stateUpdate")
            .unwrap();
        assert_eq!(frames[last_state]["state"], "paused");
        assert_eq!(data_types(&frames[last_state + 1..]), ["timeUpdate"]);
        assert_eq!(frames[last_state + 1]["t"], 0.25);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_configured_interval() {
        let config = AppConfig::default().with_tick_interval(Duration::from_millis(250));
        let (state, _) =
            seeded_state_with(config, sample_runs(1), RecordingNotifier::default()).await;
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        start(&state).await.unwrap();
        advance(Duration::from_millis(200)).await;
        assert_eq!(data_types(&drain(&mut client).await), ["stateUpdate"]);

        advance(Duration::from_millis(50)).await;
        let frames = drain(&mut client).await;
        assert_eq!(data_types(&frames), ["timeUpdate"]);
        assert_eq!(frames[0]["t"], 0.25);
    }
}
