//! The match engine orchestrator
//!
//! `MatchEngine` ties the lobby, the settings store, and the session registry
//! together behind one handle that request handlers share. Every operation is
//! synchronous and runs to completion; the returned notifications are handed
//! to the transport only after the engine call has finished, so the engine
//! itself never performs I/O.
//!
//! Locking: each structure has its own mutex. The lobby lock is held across
//! the ready hand-off so that no participant can be both waiting and in a
//! session; each session's own lock is held across the read-modify-resolve
//! sequence so every round resolves exactly once.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::lobby::WaitingLobby;
use crate::notify::{deliver_all, Notification, NotificationSink};
use crate::session::instance::SessionStatus;
use crate::session::SessionRegistry;
use crate::settings::{MatchSettings, SettingsStore};
use crate::types::{
    JoinOutcome, MatchId, MatchStarted, MatchSummary, Move, MoveOutcome, ParticipantId,
    ReadyOutcome,
};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Statistics about engine operations
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Total number of lobby joins accepted
    pub players_joined: u64,
    /// Total number of matches started
    pub matches_started: u64,
    /// Total number of matches played to completion
    pub matches_finished: u64,
    /// Total number of matches reaped for inactivity
    pub matches_reaped: u64,
    /// Total number of rounds resolved
    pub rounds_resolved: u64,
    /// Current number of live matches
    pub active_matches: usize,
    /// Current number of participants on the waiting list
    pub players_waiting: usize,
}

/// An operation's outcome together with the notifications it produced
///
/// The transport delivers the notifications after the engine call returns.
#[derive(Debug)]
pub struct Reply<T> {
    pub outcome: T,
    pub notifications: Vec<Notification>,
}

impl<T> Reply<T> {
    /// Drop the outcome and keep only the notifications
    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }
}

/// The main engine handle
pub struct MatchEngine {
    config: EngineConfig,
    lobby: Mutex<WaitingLobby>,
    registry: Mutex<SessionRegistry>,
    settings: Mutex<SettingsStore>,
    stats: RwLock<EngineStats>,
}

impl MatchEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            lobby: Mutex::new(WaitingLobby::new()),
            registry: Mutex::new(SessionRegistry::new()),
            settings: Mutex::new(SettingsStore::new()),
            stats: RwLock::new(EngineStats::default()),
        }
    }

    fn lobby(&self) -> Result<MutexGuard<'_, WaitingLobby>> {
        self.lobby.lock().map_err(|_| {
            EngineError::Internal {
                message: "Failed to acquire lobby lock".to_string(),
            }
            .into()
        })
    }

    fn registry(&self) -> Result<MutexGuard<'_, SessionRegistry>> {
        self.registry.lock().map_err(|_| {
            EngineError::Internal {
                message: "Failed to acquire registry lock".to_string(),
            }
            .into()
        })
    }

    fn settings(&self) -> Result<MutexGuard<'_, SettingsStore>> {
        self.settings.lock().map_err(|_| {
            EngineError::Internal {
                message: "Failed to acquire settings lock".to_string(),
            }
            .into()
        })
    }

    fn with_stats(&self, update: impl FnOnce(&mut EngineStats)) {
        match self.stats.write() {
            Ok(mut stats) => update(&mut stats),
            Err(_) => warn!("Failed to acquire stats lock, skipping stats update"),
        }
    }

    /// Put a participant on the waiting list
    ///
    /// Rejected with `AlreadyInMatch` while the participant has a live
    /// session, and with `AlreadyWaiting` when already queued. A defaulted
    /// settings entry is created on first contact.
    pub fn join(&self, participant: &str) -> Result<Reply<JoinOutcome>> {
        {
            let registry = self.registry()?;
            if registry.contains_participant(participant) {
                return Err(EngineError::AlreadyInMatch {
                    participant: participant.to_string(),
                }
                .into());
            }
        }

        let (waiting_count, to_notify) = {
            let mut lobby = self.lobby()?;
            let count = lobby.join(participant)?;
            // Everyone still undecided hears about the newcomer.
            let others: Vec<ParticipantId> = lobby
                .waiting()
                .into_iter()
                .filter(|p| p != participant && !lobby.is_ready(p))
                .collect();
            (count, others)
        };

        let target_players = {
            let mut settings = self.settings()?;
            settings.ensure(participant);
            settings.get(participant).players
        };

        self.with_stats(|stats| stats.players_joined += 1);

        info!(
            "Participant '{}' joined the waiting list ({}/{} players)",
            participant, waiting_count, target_players
        );

        let mut notifications = vec![Notification::text(
            participant,
            format!("You are on the waiting list. Players: {waiting_count}/{target_players}"),
        )];
        for other in to_notify {
            notifications.push(Notification::text(
                other,
                format!("{participant} joined the waiting list! Mark yourself ready to start a match."),
            ));
        }

        Ok(Reply {
            outcome: JoinOutcome {
                waiting_count,
                target_players,
            },
            notifications,
        })
    }

    /// Mark a waiting participant ready, starting a match when a pair exists
    ///
    /// The lobby lock is held across pair selection and session creation, so
    /// the hand-off is atomic: the two chosen participants leave the queue and
    /// the ready set in the same step that registers their session.
    pub fn mark_ready(&self, participant: &str) -> Result<Reply<ReadyOutcome>> {
        let mut notifications = Vec::new();

        let mut lobby = self.lobby()?;
        let player_number = lobby.mark_ready(participant)?;

        debug!(
            "Participant '{}' is ready as player {} ({} waiting, {} ready)",
            participant,
            player_number,
            lobby.waiting_count(),
            lobby.waiting().iter().filter(|p| lobby.is_ready(p)).count()
        );

        for waiting in lobby.waiting() {
            if waiting == participant {
                notifications.push(Notification::text(
                    waiting,
                    format!("You are ready to play! You are Player {player_number}."),
                ));
            } else {
                notifications.push(Notification::text(
                    waiting,
                    format!("Player {player_number} ({participant}) is ready to play!"),
                ));
            }
        }

        let started = match lobby.take_ready_pair() {
            Some((first, second)) => {
                // Round count comes from the earlier participant's settings.
                let total_rounds = self.settings()?.get(&first).rounds;
                let match_id = self
                    .registry()?
                    .create(first.clone(), second.clone(), total_rounds);

                info!(
                    "Match {} started: '{}' vs '{}', {} round(s)",
                    match_id, first, second, total_rounds
                );
                self.with_stats(|stats| stats.matches_started += 1);

                for player in [&first, &second] {
                    notifications.push(Notification::text(
                        player,
                        format!("All players are ready! The match is starting. Rounds: {total_rounds}"),
                    ));
                    notifications.push(Notification::with_move_prompt(
                        player,
                        "Round 1. Make your move:",
                    ));
                }

                Some(MatchStarted {
                    match_id,
                    first_player: first,
                    second_player: second,
                    total_rounds,
                })
            }
            None => None,
        };
        drop(lobby);

        Ok(Reply {
            outcome: ReadyOutcome {
                player_number,
                started,
            },
            notifications,
        })
    }

    /// Remove a participant from the waiting list and the ready set
    pub fn leave(&self, participant: &str) -> Result<Reply<()>> {
        self.lobby()?.leave(participant)?;
        info!("Participant '{}' left the waiting list", participant);

        Ok(Reply {
            outcome: (),
            notifications: vec![Notification::text(
                participant,
                "You have been removed from the waiting list.",
            )],
        })
    }

    /// Set a participant's pending round count
    pub fn set_rounds(&self, participant: &str, rounds: u32) -> Result<Reply<MatchSettings>> {
        let stored = {
            let mut settings = self.settings()?;
            settings.set_rounds(participant, rounds)?;
            settings.get(participant)
        };
        debug!("Participant '{}' set rounds to {}", participant, rounds);

        Ok(Reply {
            outcome: stored,
            notifications: vec![Notification::text(
                participant,
                format!("Rounds set to {rounds}."),
            )],
        })
    }

    /// Set a participant's pending target player count
    pub fn set_players(&self, participant: &str, players: u32) -> Result<Reply<MatchSettings>> {
        let stored = {
            let mut settings = self.settings()?;
            settings.set_players(participant, players)?;
            settings.get(participant)
        };
        debug!("Participant '{}' set players to {}", participant, players);

        Ok(Reply {
            outcome: stored,
            notifications: vec![Notification::text(
                participant,
                format!("Players set to {players}."),
            )],
        })
    }

    /// Set both pending values atomically
    pub fn set_both(
        &self,
        participant: &str,
        rounds: u32,
        players: u32,
    ) -> Result<Reply<MatchSettings>> {
        let stored = {
            let mut settings = self.settings()?;
            settings.set_both(participant, rounds, players)?;
            settings.get(participant)
        };
        debug!(
            "Participant '{}' set settings to {} rounds, {} players",
            participant, rounds, players
        );

        Ok(Reply {
            outcome: stored,
            notifications: vec![Notification::text(
                participant,
                format!("Settings updated: {rounds} round(s), {players} players."),
            )],
        })
    }

    /// A participant's pending settings (defaults when never configured)
    pub fn settings_for(&self, participant: &str) -> Result<MatchSettings> {
        Ok(self.settings()?.get(participant))
    }

    /// Submit a move for the participant's active match
    ///
    /// The session's own lock is held from the moment the move is recorded
    /// until the round has resolved, so the 1-to-2 pending-move transition and
    /// the resolution run exactly once per round even under racing submits.
    pub fn submit_move(&self, participant: &str, mv: Move) -> Result<Reply<MoveOutcome>> {
        let (match_id, handle) = {
            let registry = self.registry()?;
            let match_id = registry.find(participant).ok_or_else(|| {
                EngineError::NotAParticipant {
                    participant: participant.to_string(),
                }
            })?;
            let handle = registry.session(match_id).ok_or_else(|| EngineError::Internal {
                message: format!("Registry index points at missing match {match_id}"),
            })?;
            (match_id, handle)
        };

        let (outcome, first_player, second_player) = {
            let mut session = handle.lock().map_err(|_| EngineError::Internal {
                message: format!("Failed to acquire lock for match {match_id}"),
            })?;
            let outcome = session.submit_move(participant, mv)?;
            let (first, second) = session.players();
            (outcome, first.clone(), second.clone())
        };

        let mut notifications = vec![Notification::text(participant, "Move recorded.")];

        match &outcome {
            MoveOutcome::Pending => {
                debug!(
                    "Match {}: '{}' moved, waiting on the other player",
                    match_id, participant
                );
            }
            MoveOutcome::RoundComplete { winner, next_round } => {
                info!(
                    "Match {}: round {} resolved, winner: {}",
                    match_id,
                    next_round - 1,
                    winner.as_deref().unwrap_or("tie")
                );
                self.with_stats(|stats| stats.rounds_resolved += 1);

                let headline = match winner {
                    Some(winner) => format!("{winner} won the round!"),
                    None => "The round is a tie!".to_string(),
                };
                for player in [&first_player, &second_player] {
                    notifications.push(Notification::with_move_prompt(
                        player,
                        format!("{headline}\nRound {next_round}. Make your move:"),
                    ));
                }
            }
            MoveOutcome::GameOver { winner, scores } => {
                info!("Match {} finished, winner: '{}'", match_id, winner);
                self.with_stats(|stats| {
                    stats.rounds_resolved += 1;
                    stats.matches_finished += 1;
                });

                for player in [&first_player, &second_player] {
                    let own = scores.get(player).copied().unwrap_or(0);
                    let opponent = if player == &first_player {
                        &second_player
                    } else {
                        &first_player
                    };
                    let theirs = scores.get(opponent).copied().unwrap_or(0);
                    let text = if player == winner {
                        format!("Congratulations! You won the match {own}:{theirs}")
                    } else {
                        format!("The match is over! {winner} won {theirs}:{own}")
                    };
                    notifications.push(Notification::text(player, text));
                }

                self.registry()?.dispose(match_id);
            }
        }

        Ok(Reply {
            outcome,
            notifications,
        })
    }

    /// Snapshot of every live match
    pub fn active_matches(&self) -> Result<Vec<MatchSummary>> {
        Ok(self.registry()?.summaries())
    }

    /// Dispose sessions that have sat idle past the configured threshold
    ///
    /// Implements the external idle policy the round state machine itself does
    /// not define: a half-submitted round left alone long enough abandons the
    /// match and frees both participants for new lobby joins.
    pub fn reap_idle_sessions(&self) -> Result<Reply<usize>> {
        let cutoff = Utc::now()
            - chrono::Duration::seconds(self.config.session_idle_timeout_seconds as i64);

        let stale: Vec<(MatchId, ParticipantId, ParticipantId)> = {
            let registry = self.registry()?;
            registry
                .all_sessions()
                .into_iter()
                .filter_map(|handle| {
                    let session = handle.lock().ok()?;
                    if session.status() == SessionStatus::AwaitingMoves
                        && session.last_activity() < cutoff
                    {
                        let (first, second) = session.players();
                        Some((session.match_id(), first.clone(), second.clone()))
                    } else {
                        None
                    }
                })
                .collect()
        };

        let mut notifications = Vec::new();
        let mut reaped = 0;
        if !stale.is_empty() {
            let mut registry = self.registry()?;
            for (match_id, first, second) in stale {
                if registry.dispose(match_id).is_some() {
                    reaped += 1;
                    warn!("Reaped idle match {} ('{}' vs '{}')", match_id, first, second);
                    for player in [first, second] {
                        notifications.push(Notification::text(
                            player,
                            "Your match was abandoned due to inactivity.",
                        ));
                    }
                }
            }
        }

        if reaped > 0 {
            self.with_stats(|stats| stats.matches_reaped += reaped as u64);
            info!("Reaped {} idle match(es)", reaped);
        }

        Ok(Reply {
            outcome: reaped,
            notifications,
        })
    }

    /// Spawn the periodic idle-session sweep
    pub fn start_reaper_task(self: Arc<Self>, sink: Arc<dyn NotificationSink>) {
        let engine = Arc::clone(&self);

        tokio::spawn(async move {
            let mut sweep = interval(engine.config.reaper_interval());

            loop {
                sweep.tick().await;

                match engine.reap_idle_sessions() {
                    Ok(reply) => deliver_all(sink.as_ref(), reply.notifications).await,
                    Err(e) => error!("Error during idle session sweep: {}", e),
                }
            }
        });

        info!("Started idle session reaper task");
    }

    /// Current engine statistics
    pub fn stats(&self) -> Result<EngineStats> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| EngineError::Internal {
                message: "Failed to acquire stats lock".to_string(),
            })?
            .clone();
        stats.active_matches = self.registry()?.len();
        stats.players_waiting = self.lobby()?.waiting_count();
        Ok(stats)
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
