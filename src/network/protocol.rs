//! Protocol Messages
//!
//! Wire format for client-server communication. Messages are tagged JSON
//! text frames; movement updates may additionally arrive as compact
//! bincode binary frames. Only the flat `MoveUpdate` struct takes the
//! binary path, since tagged enums do not round-trip through bincode.
//!
//! The message set is closed: every kind the server understands is a
//! variant here and is matched exhaustively. Anything else fails decoding
//! at the transport edge and is dropped.

use serde::{Deserialize, Serialize};

use crate::core::vec::{Vec2, Vec3};
use crate::game::state::WorldState;

// =============================================================================
// CHANNELS
// =============================================================================

/// Delivery quality for outbound traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Reliable-ordered: control command notices.
    Reliable,
    /// Unreliable-unordered: per-tick state broadcast.
    Unreliable,
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Paddle movement update for a given client-side state id.
    Move(MoveUpdate),

    /// Claimed ball hit at a (possibly past) state id.
    Hit(HitClaim),

    /// Reset the match.
    Reset,

    /// Toggle the pause flag.
    Pause,

    /// Adjust ball pace (debug/test tooling).
    NudgePace(PaceNudge),
}

/// Paddle movement update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveUpdate {
    /// Identity of the moving player.
    pub player_id: [u8; 16],
    /// State id the client observed when sampling this position. Resolution
    /// keeps only the numerically greatest per slot within a tick's batch.
    pub state_id: u64,
    /// New paddle center.
    pub center: [f32; 3],
}

impl MoveUpdate {
    /// New paddle center as a vector.
    #[inline]
    pub fn center_vec(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }

    /// Serialize to the compact binary frame format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from the compact binary frame format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

/// Claimed ball hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitClaim {
    /// Identity of the claiming player.
    pub player_id: [u8; 16],
    /// State id at which the client saw the collision.
    pub state_id: u64,
    /// New ball heading if the claim is accepted. Taken verbatim.
    pub direction: [f32; 2],
}

impl HitClaim {
    /// Claimed heading as a vector.
    #[inline]
    pub fn direction_vec(&self) -> Vec2 {
        Vec2::from_array(self.direction)
    }
}

/// Signed ball pace adjustment (debug/test tooling).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceNudge {
    /// Delta added to the ball's pace.
    pub delta: f32,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full world state broadcast (every tick while two players are on).
    State(WorldStateUpdate),

    /// The match was reset.
    Reset,

    /// The pause flag changed.
    Pause {
        /// New pause flag value.
        paused: bool,
    },
}

/// Full world state as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldStateUpdate {
    /// State id of the broadcast world.
    pub state_id: u64,
    /// Ball state.
    pub ball: BallUpdate,
    /// Both player slots.
    pub players: [PlayerUpdate; 2],
}

/// Ball state in a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallUpdate {
    /// Center position.
    pub center: [f32; 3],
    /// Current heading.
    pub direction: [f32; 2],
    /// Current pace.
    pub pace: f32,
    /// Collision radius.
    pub radius: f32,
}

/// Player slot state in a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    /// Bound identity, if the slot is occupied.
    pub player_id: Option<[u8; 16]>,
    /// Slot index (0 or 1).
    pub slot: u8,
    /// Paddle center position.
    pub center: [f32; 3],
    /// Collision radius.
    pub radius: f32,
}

impl From<&WorldState> for WorldStateUpdate {
    fn from(world: &WorldState) -> Self {
        Self {
            state_id: world.state_id,
            ball: BallUpdate {
                center: world.ball.center.to_array(),
                direction: world.ball.direction.to_array(),
                pace: world.ball.pace,
                radius: world.ball.radius,
            },
            players: [0, 1].map(|i| {
                let p = &world.players[i];
                PlayerUpdate {
                    player_id: p.id.map(|id| id.0),
                    slot: p.slot as u8,
                    center: p.center.to_array(),
                    radius: p.radius,
                }
            }),
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::PlayerId;

    #[test]
    fn test_client_message_json_roundtrip() {
        let msg = ClientMessage::Move(MoveUpdate {
            player_id: [3; 16],
            state_id: 17,
            center: [1.0, -2.5, 0.0],
        });

        let json = msg.to_json().unwrap();
        let parsed = ClientMessage::from_json(&json).unwrap();

        if let ClientMessage::Move(m) = parsed {
            assert_eq!(m.state_id, 17);
            assert_eq!(m.center_vec(), crate::Vec3::new(1.0, -2.5, 0.0));
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_hit_claim_json_roundtrip() {
        let msg = ClientMessage::Hit(HitClaim {
            player_id: [1; 16],
            state_id: 9,
            direction: [0.6, -0.8],
        });

        let json = msg.to_json().unwrap();
        let parsed = ClientMessage::from_json(&json).unwrap();

        if let ClientMessage::Hit(h) = parsed {
            assert_eq!(h.state_id, 9);
            assert_eq!(h.direction_vec(), crate::Vec2::new(0.6, -0.8));
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_unknown_message_kind_fails_decoding() {
        assert!(ClientMessage::from_json(r#"{"type":"teleport","x":1}"#).is_err());
        assert!(ClientMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_move_update_binary_roundtrip() {
        let update = MoveUpdate {
            player_id: [9; 16],
            state_id: 1234,
            center: [-8.0, 3.5, 0.0],
        };

        let bytes = update.to_bytes().unwrap();
        let parsed = MoveUpdate::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, update);
    }

    #[test]
    fn test_state_update_mirrors_world() {
        let mut world = WorldState::new();
        let id = PlayerId::new([4; 16]);
        world.bind_slot(id);
        world.state_id = 6;
        world.ball.pace = 0.4;

        let update = WorldStateUpdate::from(&world);

        assert_eq!(update.state_id, 6);
        assert_eq!(update.ball.pace, 0.4);
        assert_eq!(update.players[0].player_id, Some(id.0));
        assert_eq!(update.players[1].player_id, None);
        assert_eq!(update.players[1].slot, 1);
    }

    #[test]
    fn test_server_message_json_roundtrip() {
        let world = WorldState::new();
        let msg = ServerMessage::State(WorldStateUpdate::from(&world));

        let json = msg.to_json().unwrap();
        let parsed = ServerMessage::from_json(&json).unwrap();

        if let ServerMessage::State(update) = parsed {
            assert_eq!(update.state_id, 0);
        } else {
            panic!("Wrong message type");
        }

        let pause = ServerMessage::Pause { paused: true }.to_json().unwrap();
        assert!(pause.contains("pause"));
    }
}
