//! Command dispatch between the transport and the engine
//!
//! The transport translates whatever it receives (chat commands, button
//! presses) into `Command` values; `EngineService` drives the engine and
//! pushes the resulting notifications back through the sink. User-correctable
//! failures become informational replies instead of errors.

use crate::engine::{MatchEngine, Reply};
use crate::error::{EngineError, Result};
use crate::notify::{deliver_all, Notification, NotificationSink};
use crate::types::Move;
use std::sync::Arc;
use tracing::{info, warn};

/// The closed set of participant commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enter the waiting list
    Join,
    /// Declare readiness to start a match
    Ready,
    /// Leave the waiting list
    Leave,
    /// Set the pending round count
    SetRounds(u32),
    /// Set the pending target player count
    SetPlayers(u32),
    /// Set both pending values atomically
    SetBoth { rounds: u32, players: u32 },
    /// Show the participant's pending settings
    ShowSettings,
    /// Submit a move for the active match
    SubmitMove(Move),
    /// List the currently active matches
    ListMatches,
}

/// Drives the engine on behalf of the transport
pub struct EngineService {
    engine: Arc<MatchEngine>,
    sink: Arc<dyn NotificationSink>,
}

impl EngineService {
    pub fn new(engine: Arc<MatchEngine>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { engine, sink }
    }

    pub fn engine(&self) -> &Arc<MatchEngine> {
        &self.engine
    }

    /// Handle one command from one participant
    ///
    /// Engine failures that the participant can correct are turned into reply
    /// notifications; only internal errors propagate to the caller.
    pub async fn handle(&self, participant: &str, command: Command) -> Result<()> {
        info!("Handling {:?} from participant '{}'", command, participant);

        let result = match command {
            Command::Join => self.engine.join(participant).map(Reply::into_notifications),
            Command::Ready => self
                .engine
                .mark_ready(participant)
                .map(Reply::into_notifications),
            Command::Leave => self.engine.leave(participant).map(Reply::into_notifications),
            Command::SetRounds(rounds) => self
                .engine
                .set_rounds(participant, rounds)
                .map(Reply::into_notifications),
            Command::SetPlayers(players) => self
                .engine
                .set_players(participant, players)
                .map(Reply::into_notifications),
            Command::SetBoth { rounds, players } => self
                .engine
                .set_both(participant, rounds, players)
                .map(Reply::into_notifications),
            Command::ShowSettings => self.engine.settings_for(participant).map(|settings| {
                vec![Notification::text(
                    participant,
                    format!(
                        "Match settings:\nRounds: {}\nPlayers: {}\nJoin the waiting list to play.",
                        settings.rounds, settings.players
                    ),
                )]
            }),
            Command::SubmitMove(mv) => self
                .engine
                .submit_move(participant, mv)
                .map(Reply::into_notifications),
            Command::ListMatches => self.engine.active_matches().map(|summaries| {
                let text = if summaries.is_empty() {
                    "No active matches.".to_string()
                } else {
                    let mut lines = vec!["Active matches:".to_string()];
                    for summary in summaries {
                        lines.push(format!(
                            "Match #{}: {} players (round {}/{})",
                            summary.match_id,
                            summary.player_count,
                            summary.current_round,
                            summary.total_rounds
                        ));
                    }
                    lines.join("\n")
                };
                vec![Notification::text(participant, text)]
            }),
        };

        let notifications = match result {
            Ok(notifications) => notifications,
            Err(e) => match self.reply_for_error(participant, &e) {
                Some(reply) => vec![reply],
                None => return Err(e),
            },
        };

        deliver_all(self.sink.as_ref(), notifications).await;
        Ok(())
    }

    /// Map a recoverable engine error to an informational reply
    ///
    /// Returns `None` for failures the participant cannot correct, which the
    /// caller propagates instead.
    fn reply_for_error(&self, participant: &str, error: &anyhow::Error) -> Option<Notification> {
        let engine_error = error.downcast_ref::<EngineError>()?;
        let text = match engine_error {
            // User-correctable, surfaced verbatim.
            EngineError::InvalidConfig { .. } => engine_error.to_string(),
            // State preconditions, informational.
            EngineError::AlreadyInMatch { .. } => {
                "You are already playing a match!".to_string()
            }
            EngineError::AlreadyWaiting { .. } => {
                "You are already on the waiting list.".to_string()
            }
            EngineError::AlreadyReady { .. } => "You are already ready to play!".to_string(),
            EngineError::NotWaiting { .. } => {
                "You are not on the waiting list. Join first.".to_string()
            }
            // Stale UI state or a transport bug; surfaced generically.
            EngineError::NotAParticipant { .. } | EngineError::SessionNotInProgress { .. } => {
                warn!(
                    "Rejected action from participant '{}': {}",
                    participant, engine_error
                );
                "That action is not available right now.".to_string()
            }
            EngineError::Internal { .. } => return None,
        };
        Some(Notification::text(participant, text))
    }
}
