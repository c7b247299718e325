//! Core primitives.
//!
//! Plain-data types shared by every part of the world model:
//! grid coordinates and deterministic state hashing.

pub mod location;
pub mod hash;

// Re-export core types
pub use location::{MapLocation, Direction};
pub use hash::{StateHash, StateHasher, compute_state_hash};
