//! World State History
//!
//! A bounded ring of past world snapshots, one per tick, used to validate
//! hit claims against positions as they existed at the claimed state id.

use std::collections::VecDeque;

use crate::game::state::{Ball, Player, PlayerId, WorldState};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable deep copy of the world at a given state id.
///
/// Never mutated after capture.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// State id the world carried when captured
    pub state_id: u64,
    /// Ball at capture time
    pub ball: Ball,
    /// Both players at capture time
    pub players: [Player; 2],
}

impl Snapshot {
    /// Capture the current world state.
    pub fn capture(world: &WorldState) -> Self {
        Self {
            state_id: world.state_id,
            ball: world.ball,
            players: world.players,
        }
    }

    /// Find the recorded player bound to `id` at capture time.
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == Some(id))
    }
}

// =============================================================================
// HISTORY RING
// =============================================================================

/// Bounded, insertion-ordered collection of snapshots.
///
/// State ids are strictly increasing across entries (one snapshot per tick,
/// one increment per tick). When an insertion exceeds capacity the oldest
/// entry is dropped.
#[derive(Debug)]
pub struct HistoryRing {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl HistoryRing {
    /// Create an empty ring holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append the newest snapshot, evicting the oldest past capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Search newest to oldest for the snapshot captured at `state_id`.
    pub fn find(&self, state_id: u64) -> Option<&Snapshot> {
        self.entries.iter().rev().find(|s| s.state_id == state_id)
    }

    /// Number of live snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no snapshot has been taken yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest retained snapshot.
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.entries.front()
    }

    /// Most recent snapshot.
    pub fn newest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_at(state_id: u64) -> Snapshot {
        let mut world = WorldState::new();
        world.state_id = state_id;
        Snapshot::capture(&world)
    }

    #[test]
    fn test_capture_is_a_deep_copy() {
        let mut world = WorldState::new();
        world.state_id = 3;
        let snap = Snapshot::capture(&world);

        world.ball.center.x = 99.0;
        world.state_id = 4;

        assert_eq!(snap.state_id, 3);
        assert_eq!(snap.ball.center.x, 0.0);
    }

    #[test]
    fn test_push_evicts_oldest_past_capacity() {
        let mut ring = HistoryRing::new(3);
        for id in 0..5 {
            ring.push(snapshot_at(id));
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.oldest().unwrap().state_id, 2);
        assert_eq!(ring.newest().unwrap().state_id, 4);
        assert!(ring.find(0).is_none());
        assert!(ring.find(1).is_none());
        assert!(ring.find(2).is_some());
    }

    #[test]
    fn test_find_hits_exact_state_id() {
        let mut ring = HistoryRing::new(10);
        for id in 0..7 {
            ring.push(snapshot_at(id));
        }

        assert_eq!(ring.find(4).unwrap().state_id, 4);
        assert!(ring.find(7).is_none());
    }

    #[test]
    fn test_snapshot_player_lookup() {
        let mut world = WorldState::new();
        let id = PlayerId::new([5; 16]);
        world.bind_slot(id);
        let snap = Snapshot::capture(&world);

        assert_eq!(snap.player_by_id(id).unwrap().slot, 0);
        assert!(snap.player_by_id(PlayerId::new([9; 16])).is_none());
    }
}
