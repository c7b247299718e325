//! # Match Viewer Core
//!
//! Spectator world-state reconstruction for a competitive robot game.
//! Consumes the simulator's ordered signal stream and keeps a world state
//! that a render front end can draw without simulating anything itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MATCH VIEWER                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Plain-data primitives                     │
//! │  ├── location.rs - Grid locations and directions             │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  world/          - State reconstruction                      │
//! │  ├── types.rs    - Teams, chassis, components                │
//! │  ├── entity.rs   - Entity record and factory capability      │
//! │  ├── registry.rs - Surface/airborne partitions, deposits     │
//! │  ├── aggregate.rs- Incremental per-team counters             │
//! │  ├── signal.rs   - Closed set of simulator signals           │
//! │  ├── dispatch.rs - One handler per signal                    │
//! │  ├── round.rs    - Round tick and dead-entity sweep          │
//! │  ├── state.rs    - WorldState read interface                 │
//! │  └── snapshot.rs - Deep copies and the shared, locked world  │
//! │                                                              │
//! │  config.rs       - Viewer settings                           │
//! │  replay.rs       - Match log replay with hash checkpoints    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Guarantee
//!
//! Per-team aggregates are maintained incrementally but always equal a
//! recount over alive entities. `SharedWorld` serializes every signal,
//! round advance and snapshot behind one lock, so a render thread only
//! ever sees whole signals and whole rounds.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod world;
pub mod config;
pub mod error;
pub mod replay;

// Re-export commonly used types
pub use core::location::{Direction, MapLocation};
pub use core::hash::StateHash;
pub use config::{DispatchConfig, ViewerConfig, Visibility};
pub use error::{ContractViolation, StateError};
pub use replay::{MatchLog, Replayer, RoundCheckpoint, RoundRecord, ReplayError};
pub use world::{
    EntityFactory, EntityId, GameMap, RobotType, SharedWorld, Signal, Team, WorldState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
