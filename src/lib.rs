//! # Volley Game Server
//!
//! Authoritative simulation core for a real-time, tick-based, two-player
//! volley match. The server owns the canonical world state, applies client
//! input with deterministic ordering and tie-breaking, and validates
//! latency-sensitive hit claims against a short history of past world
//! states (server-side lag compensation).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VOLLEY SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Math primitives                           │
//! │  └── vec.rs      - f32 2D/3D vectors                         │
//! │                                                              │
//! │  game/           - Simulation (single-threaded, per tick)    │
//! │  ├── state.rs    - Ball, players, world state, sim context   │
//! │  ├── history.rs  - Bounded snapshot ring (lag compensation)  │
//! │  ├── input.rs    - Per-tick message classification           │
//! │  ├── hit.rs      - Hit claim validation against history      │
//! │  ├── commands.rs - Control commands + peer lifecycle         │
//! │  └── tick.rs     - Fixed-timestep tick engine                │
//! │                                                              │
//! │  network/        - Transport (non-simulation)                │
//! │  ├── protocol.rs - Wire message types                        │
//! │  ├── transport.rs- Transport trait consumed by the engine    │
//! │  └── server.rs   - WebSocket transport implementation        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exclusion Discipline
//!
//! Everything in `game/` runs on the tick loop and nowhere else. Socket
//! tasks never touch world state: they feed queues that the tick loop
//! drains at a fixed point in each tick, so connect/disconnect events and
//! client messages all mutate the world from one execution context.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::vec::{Vec2, Vec3};
pub use game::history::{HistoryRing, Snapshot};
pub use game::state::{Ball, Player, PlayerId, SimContext, WorldState};
pub use game::tick::{StopSignal, TickEngine};
pub use network::transport::Transport;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Number of past world snapshots retained for lag compensation
pub const HISTORY_CAPACITY: usize = 20;
