use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Won => "Won",
            Self::Lost => "Lost",
        })
    }
}

/// One finished game. Written once, never updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub timestamp: DateTime<Utc>,
    pub duration_secs: u32,
    pub outcome: Outcome,
    /// Mines the player found; every mine for a won game.
    pub flagged_mines: u16,
    /// Mines left neither revealed nor flagged.
    pub unrevealed_mines: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_reason: Option<String>,
    pub alias: String,
}
