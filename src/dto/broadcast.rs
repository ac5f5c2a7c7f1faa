use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{checklist::ChecklistResponse, run::RunSummary, timer::TimerStateDto};

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Envelope pushed to dashboard clients, discriminated by `dataType`.
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum DashboardMessage {
    /// Periodic elapsed-time update while the timer runs.
    TimeUpdate {
        /// Elapsed seconds.
        t: f64,
    },
    /// Timer state change.
    StateUpdate {
        /// New timer state.
        state: TimerStateDto,
    },
    /// The active (previous, current, next) runs changed.
    #[serde(rename_all = "camelCase")]
    RunCurrentUpdate {
        /// Run before the current one.
        prev_run: RunSummary,
        /// Active run.
        current_run: RunSummary,
        /// Run after the current one.
        next_run: RunSummary,
        /// Run announced on stream as coming up.
        up_next: RunSummary,
        /// Schedule position of the current run.
        run_index: usize,
    },
    /// The stored schedule changed.
    RunsOnlyUpdate {
        /// Every run in schedule order.
        runs: Vec<RunSummary>,
    },
    /// The run announced as coming up changed.
    #[serde(rename_all = "camelCase")]
    UpNextUpdate {
        /// Announced run.
        up_next: RunSummary,
    },
    /// The pre-run checklist changed.
    ChecklistUpdate {
        /// Items and completion flag.
        checklist: ChecklistResponse,
    },
    /// Full snapshot sent once, to a newly connected client only.
    #[serde(rename_all = "camelCase")]
    InitialData {
        /// Every run in schedule order.
        runs: Vec<RunSummary>,
        /// Run before the current one.
        prev_run: RunSummary,
        /// Active run.
        current_run: RunSummary,
        /// Run after the current one.
        next_run: RunSummary,
        /// Run announced on stream as coming up.
        up_next: RunSummary,
        /// Schedule position of the current run.
        run_index: usize,
        /// Timer state at snapshot time.
        timer_state: TimerStateDto,
        /// Elapsed seconds at snapshot time.
        t: f64,
        /// Checklist at snapshot time.
        checklist: ChecklistResponse,
    },
}

impl DashboardMessage {
    /// Value of the `dataType` discriminator, used for logging.
    pub fn data_type(&self) -> &'static str {
        match self {
            DashboardMessage::TimeUpdate { .. } => "timeUpdate",
            DashboardMessage::StateUpdate { .. } => "stateUpdate",
            DashboardMessage::RunCurrentUpdate { .. } => "runCurrentUpdate",
            DashboardMessage::RunsOnlyUpdate { .. } => "runsOnlyUpdate",
            DashboardMessage::UpNextUpdate { .. } => "upNextUpdate",
            DashboardMessage::ChecklistUpdate { .. } => "checklistUpdate",
            DashboardMessage::InitialData { .. } => "initialData",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::run::Run;

    #[test]
    fn envelope_uses_camel_case_discriminator_and_fields() {
        let message = DashboardMessage::UpNextUpdate {
            up_next: RunSummary::from(&Run::empty()),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["dataType"], "upNextUpdate");
        assert_eq!(value["upNext"]["runID"], -1);
        assert!(value["upNext"].get("notice").is_none());

        let state = serde_json::to_value(DashboardMessage::StateUpdate {
            state: TimerStateDto::Paused,
        })
        .unwrap();
        assert_eq!(state, json!({"dataType": "stateUpdate", "state": "paused"}));
    }

    #[test]
    fn run_current_update_carries_announced_next() {
        let mut current = Run::empty();
        current.id = 4;
        let message = DashboardMessage::RunCurrentUpdate {
            prev_run: RunSummary::from(&Run::empty()),
            current_run: RunSummary::from(&current),
            next_run: RunSummary::from(&Run::empty()),
            up_next: RunSummary::from(&current),
            run_index: 3,
        };
        let value = serde_json::to_value(&message).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["currentRun", "dataType", "nextRun", "prevRun", "runIndex", "upNext"]
        );
        assert_eq!(value["upNext"]["runID"], 4);
    }
}
