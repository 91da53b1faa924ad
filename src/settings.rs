//! Per-participant pending match settings
//!
//! Settings are captured before a match exists and copied into the session at
//! creation time. Entries persist across matches and are overwritten by later
//! setting commands, never deleted.

use crate::error::{EngineError, Result};
use crate::types::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Default number of rounds for a new match
pub const DEFAULT_ROUNDS: u32 = 1;
/// Default target player count
pub const DEFAULT_PLAYERS: u32 = 2;
/// Accepted round counts
pub const ROUNDS_RANGE: RangeInclusive<u32> = 1..=15;
/// Accepted target player counts
pub const PLAYERS_RANGE: RangeInclusive<u32> = 2..=10;

/// Pending match parameters for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub rounds: u32,
    pub players: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            players: DEFAULT_PLAYERS,
        }
    }
}

fn validate_rounds(rounds: u32) -> Result<()> {
    if !ROUNDS_RANGE.contains(&rounds) {
        return Err(EngineError::InvalidConfig {
            reason: format!(
                "rounds must be between {} and {}, got {rounds}",
                ROUNDS_RANGE.start(),
                ROUNDS_RANGE.end()
            ),
        }
        .into());
    }
    Ok(())
}

fn validate_players(players: u32) -> Result<()> {
    if !PLAYERS_RANGE.contains(&players) {
        return Err(EngineError::InvalidConfig {
            reason: format!(
                "players must be between {} and {}, got {players}",
                PLAYERS_RANGE.start(),
                PLAYERS_RANGE.end()
            ),
        }
        .into());
    }
    Ok(())
}

/// In-memory store of pending settings, keyed by participant
#[derive(Debug, Default)]
pub struct SettingsStore {
    entries: HashMap<ParticipantId, MatchSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round count, preserving any stored player count
    pub fn set_rounds(&mut self, participant: &str, rounds: u32) -> Result<()> {
        validate_rounds(rounds)?;
        self.entries
            .entry(participant.to_string())
            .or_default()
            .rounds = rounds;
        Ok(())
    }

    /// Set the target player count, preserving any stored round count
    pub fn set_players(&mut self, participant: &str, players: u32) -> Result<()> {
        validate_players(players)?;
        self.entries
            .entry(participant.to_string())
            .or_default()
            .players = players;
        Ok(())
    }

    /// Set both values atomically; if either is out of range nothing changes
    pub fn set_both(&mut self, participant: &str, rounds: u32, players: u32) -> Result<()> {
        validate_rounds(rounds)?;
        validate_players(players)?;
        self.entries
            .insert(participant.to_string(), MatchSettings { rounds, players });
        Ok(())
    }

    /// Stored settings for a participant, or the defaults; never fails
    pub fn get(&self, participant: &str) -> MatchSettings {
        self.entries
            .get(participant)
            .copied()
            .unwrap_or_default()
    }

    /// Create a defaulted entry on first contact, keeping any existing one
    pub fn ensure(&mut self, participant: &str) {
        self.entries
            .entry(participant.to_string())
            .or_default();
    }
}
