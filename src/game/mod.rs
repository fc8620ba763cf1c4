//! Simulation Module
//!
//! Everything that runs inside the tick loop.
//!
//! ## Module Structure
//!
//! - `state`: ball, player slots, world state, simulation context
//! - `history`: bounded snapshot ring for lag compensation
//! - `input`: per-tick message classification and movement resolution
//! - `hit`: hit claim validation against the history ring
//! - `commands`: control commands and connection lifecycle
//! - `tick`: fixed-timestep engine driving it all

pub mod commands;
pub mod history;
pub mod hit;
pub mod input;
pub mod state;
pub mod tick;

// Re-export key types
pub use history::{HistoryRing, Snapshot};
pub use state::{Ball, Player, PlayerId, SimContext, WorldState};
pub use tick::{StopSignal, TickEngine};
