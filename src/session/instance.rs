//! A single two-party, multi-round match
//!
//! The session collects one move per participant per round, resolves the
//! round once both moves are in, and tallies scores until the configured
//! round count is exhausted.

use crate::error::{EngineError, Result};
use crate::rules;
use crate::types::{MatchId, Move, MoveOutcome, Outcome, ParticipantId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Lifecycle states of a match session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Collecting moves for the current round
    AwaitingMoves,
    /// Terminal; the final round has resolved
    Finished,
}

/// State of one active match between two fixed participants
#[derive(Debug)]
pub struct MatchSession {
    match_id: MatchId,
    first_player: ParticipantId,
    second_player: ParticipantId,
    total_rounds: u32,
    current_round: u32,
    first_score: u32,
    second_score: u32,
    /// Moves for the current round only; cleared at each round boundary.
    /// Only the two session participants ever appear as keys.
    pending: HashMap<ParticipantId, Move>,
    status: SessionStatus,
    last_activity: DateTime<Utc>,
}

impl MatchSession {
    pub fn new(
        match_id: MatchId,
        first_player: ParticipantId,
        second_player: ParticipantId,
        total_rounds: u32,
    ) -> Self {
        Self {
            match_id,
            first_player,
            second_player,
            total_rounds,
            current_round: 1,
            first_score: 0,
            second_score: 0,
            pending: HashMap::new(),
            status: SessionStatus::AwaitingMoves,
            last_activity: Utc::now(),
        }
    }

    /// Record a move for the current round, resolving it when both are in
    ///
    /// A participant may resubmit while waiting on their peer; the last move
    /// before resolution wins. Returns `Pending` until both moves are present,
    /// then either `RoundComplete` or, after the final round, `GameOver`.
    pub fn submit_move(&mut self, participant: &str, mv: Move) -> Result<MoveOutcome> {
        if !self.is_participant(participant) {
            return Err(EngineError::NotAParticipant {
                participant: participant.to_string(),
            }
            .into());
        }
        if self.status != SessionStatus::AwaitingMoves {
            return Err(EngineError::SessionNotInProgress {
                match_id: self.match_id,
            }
            .into());
        }

        self.pending.insert(participant.to_string(), mv);
        self.last_activity = Utc::now();

        if self.pending.len() < 2 {
            return Ok(MoveOutcome::Pending);
        }
        Ok(self.resolve_round())
    }

    /// Resolve the round from the two pending moves
    fn resolve_round(&mut self) -> MoveOutcome {
        let first_move = self.pending[&self.first_player];
        let second_move = self.pending[&self.second_player];

        let winner = match rules::resolve(first_move, second_move) {
            Outcome::FirstWins => {
                self.first_score += 1;
                Some(self.first_player.clone())
            }
            Outcome::SecondWins => {
                self.second_score += 1;
                Some(self.second_player.clone())
            }
            Outcome::Tie => None,
        };
        self.pending.clear();

        if self.current_round < self.total_rounds {
            self.current_round += 1;
            return MoveOutcome::RoundComplete {
                winner,
                next_round: self.current_round,
            };
        }

        self.status = SessionStatus::Finished;
        MoveOutcome::GameOver {
            winner: self.final_winner(),
            scores: self.scores(),
        }
    }

    /// The match winner by score; equal scores go to the first player
    ///
    /// The equal-score case has no fairness intent behind it, it is simply a
    /// deterministic policy favoring the earlier queue position.
    fn final_winner(&self) -> ParticipantId {
        if self.second_score > self.first_score {
            self.second_player.clone()
        } else {
            self.first_player.clone()
        }
    }

    pub fn is_participant(&self, participant: &str) -> bool {
        participant == self.first_player || participant == self.second_player
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn players(&self) -> (&ParticipantId, &ParticipantId) {
        (&self.first_player, &self.second_player)
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Current score tally keyed by participant
    pub fn scores(&self) -> HashMap<ParticipantId, u32> {
        HashMap::from([
            (self.first_player.clone(), self.first_score),
            (self.second_player.clone(), self.second_score),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(rounds: u32) -> MatchSession {
        MatchSession::new(1, "p1".to_string(), "p2".to_string(), rounds)
    }

    #[test]
    fn test_outsider_rejected() {
        let mut s = session(1);
        let err = s.submit_move("intruder", Move::Rock).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NotAParticipant { .. })
        ));
    }

    #[test]
    fn test_first_move_is_pending() {
        let mut s = session(1);
        assert_eq!(s.submit_move("p1", Move::Rock).unwrap(), MoveOutcome::Pending);
        assert_eq!(s.current_round(), 1);
    }

    #[test]
    fn test_single_round_game_over() {
        let mut s = session(1);
        s.submit_move("p1", Move::Rock).unwrap();
        let outcome = s.submit_move("p2", Move::Scissors).unwrap();
        match outcome {
            MoveOutcome::GameOver { winner, scores } => {
                assert_eq!(winner, "p1");
                assert_eq!(scores["p1"], 1);
                assert_eq!(scores["p2"], 0);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
        assert_eq!(s.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_resubmission_overwrites_pending_move() {
        let mut s = session(1);
        s.submit_move("p1", Move::Rock).unwrap();
        // Change of mind while waiting on the peer.
        s.submit_move("p1", Move::Paper).unwrap();
        let outcome = s.submit_move("p2", Move::Rock).unwrap();
        match outcome {
            MoveOutcome::GameOver { winner, .. } => assert_eq!(winner, "p1"),
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn test_round_advances_and_moves_clear() {
        let mut s = session(3);
        s.submit_move("p1", Move::Rock).unwrap();
        let outcome = s.submit_move("p2", Move::Paper).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::RoundComplete {
                winner: Some("p2".to_string()),
                next_round: 2,
            }
        );
        assert_eq!(s.current_round(), 2);
        // A fresh round collects moves again from scratch.
        assert_eq!(s.submit_move("p2", Move::Rock).unwrap(), MoveOutcome::Pending);
    }

    #[test]
    fn test_tie_round_scores_nobody() {
        let mut s = session(2);
        s.submit_move("p1", Move::Rock).unwrap();
        let outcome = s.submit_move("p2", Move::Rock).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::RoundComplete {
                winner: None,
                next_round: 2,
            }
        );
        assert_eq!(s.scores()["p1"], 0);
        assert_eq!(s.scores()["p2"], 0);
    }

    #[test]
    fn test_finishes_exactly_after_total_rounds() {
        let mut s = session(3);
        for round in 1..=3u32 {
            assert_eq!(s.status(), SessionStatus::AwaitingMoves);
            s.submit_move("p1", Move::Rock).unwrap();
            let outcome = s.submit_move("p2", Move::Scissors).unwrap();
            if round < 3 {
                assert!(matches!(outcome, MoveOutcome::RoundComplete { .. }));
            } else {
                assert!(matches!(outcome, MoveOutcome::GameOver { .. }));
            }
        }
        assert_eq!(s.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_scores_sum_to_rounds_without_ties() {
        let mut s = session(4);
        let plays = [
            (Move::Rock, Move::Scissors),
            (Move::Paper, Move::Scissors),
            (Move::Rock, Move::Paper),
            (Move::Scissors, Move::Paper),
        ];
        for (a, b) in plays {
            s.submit_move("p1", a).unwrap();
            s.submit_move("p2", b).unwrap();
        }
        let scores = s.scores();
        assert_eq!(scores["p1"] + scores["p2"], 4);
    }

    #[test]
    fn test_equal_final_scores_go_to_first_player() {
        let mut s = session(2);
        // p1 takes round one, p2 takes round two.
        s.submit_move("p1", Move::Rock).unwrap();
        s.submit_move("p2", Move::Scissors).unwrap();
        s.submit_move("p1", Move::Rock).unwrap();
        let outcome = s.submit_move("p2", Move::Paper).unwrap();
        match outcome {
            MoveOutcome::GameOver { winner, scores } => {
                assert_eq!(scores["p1"], 1);
                assert_eq!(scores["p2"], 1);
                assert_eq!(winner, "p1");
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn test_moves_rejected_after_finish() {
        let mut s = session(1);
        s.submit_move("p1", Move::Rock).unwrap();
        s.submit_move("p2", Move::Rock).unwrap();
        let err = s.submit_move("p1", Move::Paper).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::SessionNotInProgress { .. })
        ));
    }
}
