use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::RunEntity,
    state::{
        progression::{Direction, RunProgression},
        run::{CompletionRecord, Participant, Run},
    },
};

/// Wire representation of a run, shared by REST responses and broadcasts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Catalog identifier, `-1` for sentinel runs.
    #[serde(rename = "runID")]
    pub id: i64,
    /// Game metadata.
    pub game_info: GameInfoDto,
    /// Category, platform and estimate.
    pub run_info: RunInfoDto,
    /// Participants in display order.
    pub players: Vec<ParticipantDto>,
    /// Present on the placeholder run shown while the schedule is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Game metadata of a run.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameInfoDto {
    /// Display name of the game.
    pub game_name: String,
    /// Release year.
    pub release_year: i32,
}

/// Category, platform and estimate of a run.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunInfoDto {
    /// Estimate in seconds.
    pub estimate: i64,
    /// Speedrun category.
    pub category: String,
    /// Platform played on.
    pub platform: String,
}

/// A runner of a run, with their completion record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    /// Catalog identifier.
    pub id: i64,
    /// Name shown on stream.
    pub display_name: String,
    /// Country code.
    pub country: String,
    /// Twitter handle.
    pub twitter_name: String,
    /// Twitch channel.
    pub twitch_name: String,
    /// YouTube channel.
    pub youtube_name: String,
    /// Completion record.
    pub timer: CompletionDto,
}

/// Completion record; `time` is in seconds.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct CompletionDto {
    /// Whether the runner finished.
    pub finished: bool,
    /// Finish time in seconds, `0` until finished.
    pub time: f64,
}

impl From<CompletionRecord> for CompletionDto {
    fn from(value: CompletionRecord) -> Self {
        Self {
            finished: value.finished,
            time: value.time.as_secs_f64(),
        }
    }
}

impl From<&Participant> for ParticipantDto {
    fn from(value: &Participant) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name.clone(),
            country: value.country.clone(),
            twitter_name: value.twitter_name.clone(),
            twitch_name: value.twitch_name.clone(),
            youtube_name: value.youtube_name.clone(),
            timer: value.completion.into(),
        }
    }
}

impl From<&Run> for RunSummary {
    fn from(value: &Run) -> Self {
        Self {
            id: value.id,
            game_info: GameInfoDto {
                game_name: value.game_info.game_name.clone(),
                release_year: value.game_info.release_year,
            },
            run_info: RunInfoDto {
                estimate: value.run_info.estimate,
                category: value.run_info.category.clone(),
                platform: value.run_info.platform.clone(),
            },
            players: value.players.iter().map(ParticipantDto::from).collect(),
            notice: value.notice.clone(),
        }
    }
}

impl From<RunEntity> for RunSummary {
    fn from(value: RunEntity) -> Self {
        RunSummary::from(&Run::from(value))
    }
}

/// The active (previous, current, next) runs plus the announced next run.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRunsResponse {
    /// Run before the current one.
    pub prev_run: RunSummary,
    /// Active run.
    pub current_run: RunSummary,
    /// Run after the current one.
    pub next_run: RunSummary,
    /// Run announced on stream as coming up.
    pub up_next: RunSummary,
    /// Schedule position of the current run.
    pub run_index: usize,
}

impl From<&RunProgression> for ActiveRunsResponse {
    fn from(value: &RunProgression) -> Self {
        let triple = value.active_triple();
        Self {
            prev_run: (&triple.prev).into(),
            current_run: (&triple.current).into(),
            next_run: (&triple.next).into(),
            up_next: value.up_next().into(),
            run_index: value.index(),
        }
    }
}

/// Full schedule in order.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunsResponse {
    /// Every run in schedule order.
    pub runs: Vec<RunSummary>,
}

/// Request body of `POST /run/switch`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchRunRequest {
    /// Which neighbour to switch to.
    pub direction: Direction,
}

/// Response of `POST /run/layout`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpNextResponse {
    /// Newly announced run.
    pub up_next: RunSummary,
}
