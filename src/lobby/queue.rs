//! Waiting queue and ready set
//!
//! Participants move through `NotInLobby -> Waiting -> Ready` and leave the
//! lobby either explicitly or through the atomic hand-off that starts a match.
//! The ready set is always a subset of the waiting queue.

use crate::error::{EngineError, Result};
use crate::types::ParticipantId;
use std::collections::{HashSet, VecDeque};

/// The lobby's waiting/ready state
///
/// Join order is preserved; a participant's player number is their 1-based
/// position in the queue at ready time and is not renumbered when earlier
/// participants leave.
#[derive(Debug, Default)]
pub struct WaitingLobby {
    queue: VecDeque<ParticipantId>,
    ready: HashSet<ParticipantId>,
}

impl WaitingLobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant to the waiting queue
    ///
    /// Returns the waiting count after the join. Fails with `AlreadyWaiting`
    /// (no mutation) when the participant is already queued.
    pub fn join(&mut self, participant: &str) -> Result<usize> {
        if self.contains(participant) {
            return Err(EngineError::AlreadyWaiting {
                participant: participant.to_string(),
            }
            .into());
        }
        self.queue.push_back(participant.to_string());
        Ok(self.queue.len())
    }

    /// Mark a waiting participant as ready
    ///
    /// Returns the participant's stable player number (1-based queue position).
    pub fn mark_ready(&mut self, participant: &str) -> Result<usize> {
        let position = self.queue.iter().position(|p| p == participant).ok_or_else(|| {
            EngineError::NotWaiting {
                participant: participant.to_string(),
            }
        })?;
        if !self.ready.insert(participant.to_string()) {
            return Err(EngineError::AlreadyReady {
                participant: participant.to_string(),
            }
            .into());
        }
        Ok(position + 1)
    }

    /// Remove a participant from the queue and the ready set
    pub fn leave(&mut self, participant: &str) -> Result<()> {
        let position = self.queue.iter().position(|p| p == participant).ok_or_else(|| {
            EngineError::NotWaiting {
                participant: participant.to_string(),
            }
        })?;
        self.queue.remove(position);
        self.ready.remove(participant);
        Ok(())
    }

    /// Remove and return the first two ready participants, in queue order
    ///
    /// Selection always prefers the earliest queue position among ready
    /// participants, so the hand-off is deterministic. Returns `None` when no
    /// such pair exists; the lobby is unchanged in that case.
    pub fn take_ready_pair(&mut self) -> Option<(ParticipantId, ParticipantId)> {
        if self.ready.len() < 2 || self.queue.len() < 2 {
            return None;
        }
        let picks: Vec<usize> = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, p)| self.ready.contains(*p))
            .map(|(position, _)| position)
            .take(2)
            .collect();
        if picks.len() < 2 {
            return None;
        }
        // Remove back-to-front so the first index stays valid.
        let second = self.queue.remove(picks[1])?;
        let first = self.queue.remove(picks[0])?;
        self.ready.remove(&first);
        self.ready.remove(&second);
        Some((first, second))
    }

    pub fn contains(&self, participant: &str) -> bool {
        self.queue.iter().any(|p| p == participant)
    }

    pub fn is_ready(&self, participant: &str) -> bool {
        self.ready.contains(participant)
    }

    pub fn waiting_count(&self) -> usize {
        self.queue.len()
    }

    /// Current waiting queue, in join order
    pub fn waiting(&self) -> Vec<ParticipantId> {
        self.queue.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_is_subset_of_queue(lobby: &WaitingLobby) -> bool {
        lobby.ready.iter().all(|p| lobby.contains(p))
    }

    #[test]
    fn test_join_preserves_order() {
        let mut lobby = WaitingLobby::new();
        assert_eq!(lobby.join("p1").unwrap(), 1);
        assert_eq!(lobby.join("p2").unwrap(), 2);
        assert_eq!(lobby.join("p3").unwrap(), 3);
        assert_eq!(lobby.waiting(), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_duplicate_join_is_idempotent_failure() {
        let mut lobby = WaitingLobby::new();
        lobby.join("p1").unwrap();
        let err = lobby.join("p1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::AlreadyWaiting { .. })
        ));
        assert_eq!(lobby.waiting_count(), 1);
    }

    #[test]
    fn test_mark_ready_requires_waiting() {
        let mut lobby = WaitingLobby::new();
        let err = lobby.mark_ready("ghost").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NotWaiting { .. })
        ));
    }

    #[test]
    fn test_mark_ready_twice_rejected() {
        let mut lobby = WaitingLobby::new();
        lobby.join("p1").unwrap();
        assert_eq!(lobby.mark_ready("p1").unwrap(), 1);
        let err = lobby.mark_ready("p1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::AlreadyReady { .. })
        ));
    }

    #[test]
    fn test_player_numbers_follow_queue_position() {
        let mut lobby = WaitingLobby::new();
        lobby.join("p1").unwrap();
        lobby.join("p2").unwrap();
        lobby.join("p3").unwrap();
        assert_eq!(lobby.mark_ready("p3").unwrap(), 3);
        assert_eq!(lobby.mark_ready("p1").unwrap(), 1);
    }

    #[test]
    fn test_take_ready_pair_prefers_earliest_positions() {
        let mut lobby = WaitingLobby::new();
        for p in ["p1", "p2", "p3", "p4"] {
            lobby.join(p).unwrap();
        }
        lobby.mark_ready("p4").unwrap();
        lobby.mark_ready("p2").unwrap();

        let (first, second) = lobby.take_ready_pair().unwrap();
        assert_eq!(first, "p2");
        assert_eq!(second, "p4");
        // Non-ready participants stay queued.
        assert_eq!(lobby.waiting(), vec!["p1", "p3"]);
        assert!(ready_is_subset_of_queue(&lobby));
    }

    #[test]
    fn test_take_ready_pair_needs_two_ready() {
        let mut lobby = WaitingLobby::new();
        lobby.join("p1").unwrap();
        lobby.join("p2").unwrap();
        lobby.mark_ready("p1").unwrap();
        assert!(lobby.take_ready_pair().is_none());
        assert_eq!(lobby.waiting_count(), 2);
    }

    #[test]
    fn test_leave_clears_ready_membership() {
        let mut lobby = WaitingLobby::new();
        lobby.join("p1").unwrap();
        lobby.mark_ready("p1").unwrap();
        lobby.leave("p1").unwrap();
        assert!(!lobby.contains("p1"));
        assert!(!lobby.is_ready("p1"));
        assert!(ready_is_subset_of_queue(&lobby));

        let err = lobby.leave("p1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NotWaiting { .. })
        ));
    }
}
