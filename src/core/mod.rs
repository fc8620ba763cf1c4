//! Core math primitives.
//!
//! Small float vector types shared by the simulation and the wire format.

pub mod vec;

// Re-export core types
pub use vec::{Vec2, Vec3};
