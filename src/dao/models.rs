use serde::{Deserialize, Serialize};

/// Run document as stored in the catalog and imported from the runs file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunEntity {
    /// Catalog identifier; assigned on import when absent.
    #[serde(rename = "runID", default)]
    pub id: Option<i64>,
    /// Game metadata.
    #[serde(default)]
    pub game_info: GameInfoEntity,
    /// Category / platform / estimate metadata.
    #[serde(default)]
    pub run_info: RunInfoEntity,
    /// Ordered participants with their completion records.
    #[serde(default)]
    pub players: Vec<ParticipantEntity>,
}

/// Game metadata of a stored run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameInfoEntity {
    /// Display name of the game.
    pub game_name: String,
    /// Year the game was released.
    pub release_year: i32,
}

/// Run metadata of a stored run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RunInfoEntity {
    /// Estimate in seconds.
    pub estimate: i64,
    /// Speedrun category.
    pub category: String,
    /// Platform.
    pub platform: String,
}

/// Participant of a stored run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantEntity {
    /// Catalog identifier of the participant.
    pub id: i64,
    /// Name shown on stream.
    pub display_name: String,
    /// Country code.
    pub country: String,
    /// Twitter handle.
    pub twitter_name: String,
    /// Twitch channel name.
    pub twitch_name: String,
    /// YouTube channel name.
    pub youtube_name: String,
    /// Completion record.
    pub timer: CompletionEntity,
}

/// Stored completion record; `time` is expressed in seconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionEntity {
    /// Whether the participant finished.
    pub finished: bool,
    /// Finish time in seconds.
    pub time: f64,
}
