//! Common types used throughout the match engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Opaque stable identifier for a remote participant
pub type ParticipantId = String;

/// Unique identifier for matches, assigned monotonically by the registry
pub type MatchId = u64;

/// One of the three playable moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// All moves, in the order the transport renders its selection prompt
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rock" => Ok(Move::Rock),
            "paper" => Ok(Move::Paper),
            "scissors" => Ok(Move::Scissors),
            other => Err(format!("unknown move: {other}")),
        }
    }
}

/// Result of comparing two simultaneous moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Tie,
}

/// Outcome of a successful lobby join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinOutcome {
    /// Number of participants now on the waiting list
    pub waiting_count: usize,
    /// The joining participant's configured target player count
    pub target_players: u32,
}

/// Details of a match created by the ready hand-off
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStarted {
    pub match_id: MatchId,
    pub first_player: ParticipantId,
    pub second_player: ParticipantId,
    pub total_rounds: u32,
}

/// Outcome of marking a participant ready
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyOutcome {
    /// Stable ordinal position in the waiting list (1-based)
    pub player_number: usize,
    /// Present when this readiness completed a pair and started a match
    pub started: Option<MatchStarted>,
}

/// Result of submitting a move to an active match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Move recorded; waiting on the other participant
    Pending,
    /// Both moves were in and the round resolved, more rounds remain
    RoundComplete {
        /// Round winner, `None` on a tie
        winner: Option<ParticipantId>,
        next_round: u32,
    },
    /// The final round resolved and the match is over
    GameOver {
        winner: ParticipantId,
        scores: HashMap<ParticipantId, u32>,
    },
}

/// Snapshot of one active match, for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub player_count: usize,
    pub current_round: u32,
    pub total_rounds: u32,
}
