//! Game State Definitions
//!
//! The live world state for a two-player volley match: one ball, exactly
//! two player slots, and the monotonic state id that stamps every tick.

use serde::{Deserialize, Serialize};

use crate::core::vec::{Vec2, Vec3};
use crate::game::history::HistoryRing;
use crate::HISTORY_CAPACITY;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Fixed start position for each player slot (slot 0 left, slot 1 right).
pub const PLAYER_START_POSITIONS: [Vec3; 2] = [
    Vec3::new(-8.0, 0.0, 0.0),
    Vec3::new(8.0, 0.0, 0.0),
];

/// Paddle collision radius.
pub const PLAYER_RADIUS: f32 = 1.0;

/// Ball collision radius.
pub const BALL_RADIUS: f32 = 0.5;

/// Ball speed after a reset. The ball sits still (zero direction) until a
/// validated hit gives it a heading.
pub const BALL_START_PACE: f32 = 0.15;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Stable player identifier (UUID as bytes), assigned by the transport when
/// a client connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// BALL
// =============================================================================

/// The single moving point-mass.
///
/// `direction` is accepted verbatim from validated hit claims and is not
/// normalized by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Center position (z unused for gameplay)
    pub center: Vec3,
    /// Heading (2D); zero until the first validated hit
    pub direction: Vec2,
    /// Speed scalar applied to `direction` each unpaused tick
    pub pace: f32,
    /// Collision radius
    pub radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            direction: Vec2::ZERO,
            pace: BALL_START_PACE,
            radius: BALL_RADIUS,
        }
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// One of the two fixed player slots.
///
/// `id` is `None` until a connection binds the slot; the slot index is fixed
/// for the lifetime of that connection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Bound connection identity, if any
    pub id: Option<PlayerId>,
    /// Slot index (0 or 1)
    pub slot: usize,
    /// Paddle center position (z unused for gameplay)
    pub center: Vec3,
    /// Collision radius
    pub radius: f32,
}

impl Player {
    /// Create an unbound player at its slot's start position.
    pub fn new(slot: usize) -> Self {
        Self {
            id: None,
            slot,
            center: PLAYER_START_POSITIONS[slot],
            radius: PLAYER_RADIUS,
        }
    }
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// The single mutable live world state.
///
/// Created once at server start and reset in place, never replaced.
/// `state_id` increments by exactly 1 every tick, independent of pause
/// state and player count.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldState {
    /// The ball
    pub ball: Ball,
    /// Exactly two player slots
    pub players: [Player; 2],
    /// Monotonic tick counter, starts at 0
    pub state_id: u64,
}

impl WorldState {
    /// Create the initial world state.
    pub fn new() -> Self {
        Self {
            ball: Ball::default(),
            players: [Player::new(0), Player::new(1)],
            state_id: 0,
        }
    }

    /// Reset the world in place: fresh ball, both players back at their
    /// start positions. Slot bindings, `state_id`, and history are untouched.
    pub fn reset(&mut self) {
        self.ball = Ball::default();
        self.players[0].center = PLAYER_START_POSITIONS[0];
        self.players[1].center = PLAYER_START_POSITIONS[1];
    }

    /// Bind a connection identity to the first free slot.
    ///
    /// Returns the slot index, or `None` when both slots are taken.
    pub fn bind_slot(&mut self, id: PlayerId) -> Option<usize> {
        for player in &mut self.players {
            if player.id.is_none() {
                player.id = Some(id);
                return Some(player.slot);
            }
        }
        None
    }

    /// Release the slot bound to `id`, if any. Returns the freed slot index.
    pub fn release_slot(&mut self, id: PlayerId) -> Option<usize> {
        for player in &mut self.players {
            if player.id == Some(id) {
                player.id = None;
                return Some(player.slot);
            }
        }
        None
    }

    /// Find the player bound to `id`.
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == Some(id))
    }

    /// Find the player bound to `id`, mutably.
    pub fn player_by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == Some(id))
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SIMULATION CONTEXT
// =============================================================================

/// Everything the tick loop owns, constructed explicitly at startup and
/// handed to the engine. There is no process-global simulation state.
#[derive(Debug)]
pub struct SimContext {
    /// The live world
    pub world: WorldState,
    /// Past snapshots for lag compensation
    pub history: HistoryRing,
    /// Pause flag; gates physics integration only
    pub paused: bool,
    /// Connected player count (0..=2)
    pub connected: u32,
}

impl SimContext {
    /// Create a fresh context with an empty history ring.
    pub fn new() -> Self {
        Self {
            world: WorldState::new(),
            history: HistoryRing::new(HISTORY_CAPACITY),
            paused: false,
            connected: 0,
        }
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
