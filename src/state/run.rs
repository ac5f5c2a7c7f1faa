use std::time::Duration;

use thiserror::Error;

use crate::dao::models::{CompletionEntity, GameInfoEntity, ParticipantEntity, RunEntity, RunInfoEntity};

/// Identifier carried by the sentinel run used in place of a missing neighbour.
pub const RUN_ID_EMPTY: i64 = -1;

/// Game metadata attached to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    /// Display name of the game.
    pub game_name: String,
    /// Year the game was released.
    pub release_year: i32,
}

/// Category, platform and estimate metadata attached to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfo {
    /// Scheduled estimate in seconds.
    pub estimate: i64,
    /// Speedrun category (e.g. "Any%").
    pub category: String,
    /// Platform the run is played on.
    pub platform: String,
}

/// Completion record of a single participant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionRecord {
    /// Whether the participant crossed the finish line.
    pub finished: bool,
    /// Elapsed timer value at the moment the participant finished.
    pub time: Duration,
}

/// One competitor within a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Participant {
    /// Catalog identifier of the participant.
    pub id: i64,
    /// Name shown on stream.
    pub display_name: String,
    /// Country code, free-form.
    pub country: String,
    /// Twitter handle.
    pub twitter_name: String,
    /// Twitch channel name.
    pub twitch_name: String,
    /// YouTube channel name.
    pub youtube_name: String,
    /// Completion record, written only by the timer.
    pub completion: CompletionRecord,
}

/// A single timed segment of the marathon together with its participants.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Catalog identifier, [`RUN_ID_EMPTY`] for sentinel runs.
    pub id: i64,
    /// Game metadata.
    pub game_info: GameInfo,
    /// Category / platform / estimate metadata.
    pub run_info: RunInfo,
    /// Ordered participants.
    pub players: Vec<Participant>,
    /// Human-readable notice shown instead of game metadata on placeholder runs.
    pub notice: Option<String>,
}

/// Errors raised when touching a participant of the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantError {
    /// The index does not address a participant of the current run.
    #[error("participant {index} does not exist (run has {count} participants)")]
    OutOfRange {
        /// Requested participant index.
        index: usize,
        /// Number of participants in the run.
        count: usize,
    },
    /// The participant already has a completion time.
    #[error("participant {0} already finished")]
    AlreadyFinished(usize),
}

impl Run {
    /// Sentinel used at the catalog boundaries instead of a missing run.
    pub fn empty() -> Self {
        Self {
            id: RUN_ID_EMPTY,
            game_info: GameInfo::default(),
            run_info: RunInfo::default(),
            players: Vec::new(),
            notice: None,
        }
    }

    /// Sentinel shown as the current run while the catalog has no runs at all.
    pub fn placeholder(notice: impl Into<String>) -> Self {
        Self {
            notice: Some(notice.into()),
            ..Self::empty()
        }
    }

    /// Whether this run is a sentinel rather than a catalog entry.
    pub fn is_empty_run(&self) -> bool {
        self.id == RUN_ID_EMPTY
    }

    /// Ensure `index` can be marked finished.
    pub fn check_finishable(&self, index: usize) -> Result<(), ParticipantError> {
        let participant = self.players.get(index).ok_or(ParticipantError::OutOfRange {
            index,
            count: self.players.len(),
        })?;
        if participant.completion.finished {
            return Err(ParticipantError::AlreadyFinished(index));
        }
        Ok(())
    }

    /// Number of participants still running once `index` has finished.
    pub fn remaining_after(&self, index: usize) -> usize {
        self.players
            .iter()
            .enumerate()
            .filter(|(i, p)| *i != index && !p.completion.finished)
            .count()
    }

    /// Mark a single participant finished at `time`.
    pub fn finish_participant(&mut self, index: usize, time: Duration) -> Result<(), ParticipantError> {
        self.check_finishable(index)?;
        self.players[index].completion = CompletionRecord {
            finished: true,
            time,
        };
        Ok(())
    }

    /// Finish every participant that has not finished yet; explicit times are kept.
    pub fn finish_remaining(&mut self, time: Duration) {
        for player in self.players.iter_mut().filter(|p| !p.completion.finished) {
            player.completion = CompletionRecord {
                finished: true,
                time,
            };
        }
    }

    /// Clear every completion record back to `{finished: false, time: 0}`.
    pub fn clear_completion(&mut self) {
        for player in &mut self.players {
            player.completion = CompletionRecord::default();
        }
    }

    /// Whether any participant carries a finish flag or a time.
    pub fn has_completion(&self) -> bool {
        self.players
            .iter()
            .any(|p| p.completion != CompletionRecord::default())
    }

    /// True when every participant has finished. Runs without participants never are.
    pub fn all_finished(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.completion.finished)
    }
}

impl From<CompletionEntity> for CompletionRecord {
    fn from(value: CompletionEntity) -> Self {
        Self {
            finished: value.finished,
            time: Duration::try_from_secs_f64(value.time).unwrap_or_default(),
        }
    }
}

impl From<CompletionRecord> for CompletionEntity {
    fn from(value: CompletionRecord) -> Self {
        Self {
            finished: value.finished,
            time: value.time.as_secs_f64(),
        }
    }
}

impl From<ParticipantEntity> for Participant {
    fn from(value: ParticipantEntity) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
            country: value.country,
            twitter_name: value.twitter_name,
            twitch_name: value.twitch_name,
            youtube_name: value.youtube_name,
            completion: value.timer.into(),
        }
    }
}

impl From<Participant> for ParticipantEntity {
    fn from(value: Participant) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
            country: value.country,
            twitter_name: value.twitter_name,
            twitch_name: value.twitch_name,
            youtube_name: value.youtube_name,
            timer: value.completion.into(),
        }
    }
}

impl From<RunEntity> for Run {
    fn from(value: RunEntity) -> Self {
        Self {
            id: value.id.unwrap_or(RUN_ID_EMPTY),
            game_info: GameInfo {
                game_name: value.game_info.game_name,
                release_year: value.game_info.release_year,
            },
            run_info: RunInfo {
                estimate: value.run_info.estimate,
                category: value.run_info.category,
                platform: value.run_info.platform,
            },
            players: value.players.into_iter().map(Into::into).collect(),
            notice: None,
        }
    }
}

impl From<Run> for RunEntity {
    fn from(value: Run) -> Self {
        Self {
            id: Some(value.id),
            game_info: GameInfoEntity {
                game_name: value.game_info.game_name,
                release_year: value.game_info.release_year,
            },
            run_info: RunInfoEntity {
                estimate: value.run_info.estimate,
                category: value.run_info.category,
                platform: value.run_info.platform,
            },
            players: value.players.into_iter().map(Into::into).collect(),
        }
    }
}
