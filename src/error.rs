//! Error types for the match engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific engine scenarios
///
/// Every variant is a recoverable per-request failure returned to the caller;
/// none is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Participant {participant} is already in an active match")]
    AlreadyInMatch { participant: String },

    #[error("Participant {participant} is already on the waiting list")]
    AlreadyWaiting { participant: String },

    #[error("Participant {participant} is already marked ready")]
    AlreadyReady { participant: String },

    #[error("Participant {participant} is not on the waiting list")]
    NotWaiting { participant: String },

    #[error("Participant {participant} is not part of this match")]
    NotAParticipant { participant: String },

    #[error("Match {match_id} is not accepting moves")]
    SessionNotInProgress { match_id: u64 },

    #[error("Internal engine error: {message}")]
    Internal { message: String },
}
