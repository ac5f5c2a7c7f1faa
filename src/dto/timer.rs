use serde::Serialize;
use utoipa::ToSchema;

use crate::state::timer::{TimerPhase, TimerSnapshot};

/// Timer state as exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerStateDto {
    /// Not started, or reset.
    Stopped,
    /// Counting.
    Running,
    /// Frozen, resumable.
    Paused,
    /// Frozen until reset or restart.
    Finished,
}

impl From<TimerPhase> for TimerStateDto {
    fn from(value: TimerPhase) -> Self {
        match value {
            TimerPhase::Stopped => TimerStateDto::Stopped,
            TimerPhase::Running => TimerStateDto::Running,
            TimerPhase::Paused => TimerStateDto::Paused,
            TimerPhase::Finished => TimerStateDto::Finished,
        }
    }
}

/// Timer state and elapsed seconds.
#[derive(Debug, Serialize, ToSchema, Clone, Copy)]
pub struct TimerSnapshotResponse {
    /// Current timer state.
    pub state: TimerStateDto,
    /// Elapsed running time in seconds.
    pub t: f64,
}

impl From<TimerSnapshot> for TimerSnapshotResponse {
    fn from(value: TimerSnapshot) -> Self {
        Self {
            state: value.phase.into(),
            t: value.elapsed.as_secs_f64(),
        }
    }
}
