//! Registry of live match sessions
//!
//! Owns every active session and a derived participant index so that lobby
//! joins can cheaply reject participants who are already playing. Match ids
//! are assigned monotonically.

use crate::session::instance::MatchSession;
use crate::types::{MatchId, MatchSummary, ParticipantId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Live sessions keyed by match id, with a participant lookup index
///
/// Each session sits behind its own mutex so that two racing move submissions
/// serialize on the session, not on the whole registry.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<MatchId, Arc<Mutex<MatchSession>>>,
    by_participant: HashMap<ParticipantId, MatchId>,
    next_id: MatchId,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            by_participant: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a session for two distinct, currently unregistered participants
    ///
    /// The caller (the engine's ready hand-off) guarantees both preconditions,
    /// so creation itself cannot fail.
    pub fn create(
        &mut self,
        first_player: ParticipantId,
        second_player: ParticipantId,
        total_rounds: u32,
    ) -> MatchId {
        let match_id = self.next_id;
        self.next_id += 1;

        self.by_participant
            .insert(first_player.clone(), match_id);
        self.by_participant
            .insert(second_player.clone(), match_id);
        let session = MatchSession::new(match_id, first_player, second_player, total_rounds);
        self.sessions.insert(match_id, Arc::new(Mutex::new(session)));
        match_id
    }

    /// The match a participant is currently playing, if any
    pub fn find(&self, participant: &str) -> Option<MatchId> {
        self.by_participant.get(participant).copied()
    }

    pub fn contains_participant(&self, participant: &str) -> bool {
        self.by_participant.contains_key(participant)
    }

    /// Handle to a session's lock
    pub fn session(&self, match_id: MatchId) -> Option<Arc<Mutex<MatchSession>>> {
        self.sessions.get(&match_id).cloned()
    }

    /// All session handles, for sweeps over the live set
    pub fn all_sessions(&self) -> Vec<Arc<Mutex<MatchSession>>> {
        self.sessions.values().cloned().collect()
    }

    /// Snapshot of every live match for status queries
    pub fn summaries(&self) -> Vec<MatchSummary> {
        let mut summaries: Vec<MatchSummary> = self
            .sessions
            .values()
            .filter_map(|handle| {
                let session = handle.lock().ok()?;
                Some(MatchSummary {
                    match_id: session.match_id(),
                    player_count: 2,
                    current_round: session.current_round(),
                    total_rounds: session.total_rounds(),
                })
            })
            .collect();
        summaries.sort_by_key(|s| s.match_id);
        summaries
    }

    /// Remove a finished session and both participant mappings
    pub fn dispose(&mut self, match_id: MatchId) -> Option<Arc<Mutex<MatchSession>>> {
        let handle = self.sessions.remove(&match_id)?;
        self.by_participant.retain(|_, id| *id != match_id);
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    #[test]
    fn test_monotonic_match_ids() {
        let mut registry = SessionRegistry::new();
        let a = registry.create("p1".into(), "p2".into(), 1);
        let b = registry.create("p3".into(), "p4".into(), 1);
        assert!(b > a);
    }

    #[test]
    fn test_participant_lookup() {
        let mut registry = SessionRegistry::new();
        let id = registry.create("p1".into(), "p2".into(), 3);
        assert_eq!(registry.find("p1"), Some(id));
        assert_eq!(registry.find("p2"), Some(id));
        assert_eq!(registry.find("p3"), None);
    }

    #[test]
    fn test_summaries_reflect_round_progress() {
        let mut registry = SessionRegistry::new();
        let id = registry.create("p1".into(), "p2".into(), 3);

        {
            let handle = registry.session(id).unwrap();
            let mut session = handle.lock().unwrap();
            session.submit_move("p1", Move::Rock).unwrap();
            session.submit_move("p2", Move::Paper).unwrap();
        }

        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].match_id, id);
        assert_eq!(summaries[0].player_count, 2);
        assert_eq!(summaries[0].current_round, 2);
        assert_eq!(summaries[0].total_rounds, 3);
    }

    #[test]
    fn test_dispose_clears_participant_mappings() {
        let mut registry = SessionRegistry::new();
        let id = registry.create("p1".into(), "p2".into(), 1);
        assert!(registry.dispose(id).is_some());
        assert!(registry.is_empty());
        assert_eq!(registry.find("p1"), None);
        assert_eq!(registry.find("p2"), None);
        // Disposing twice is a no-op.
        assert!(registry.dispose(id).is_none());
    }
}
