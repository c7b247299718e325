//! World State Reconstruction
//!
//! Registry, aggregates, signal dispatch, round advancement and snapshots.

pub mod types;
pub mod entity;
pub mod deposit;
pub mod registry;
pub mod aggregate;
pub mod map;
pub mod stats;
pub mod signal;
pub mod dispatch;
pub mod round;
pub mod state;
pub mod snapshot;

pub use types::{ComponentClass, ComponentType, RobotType, TargetHeight, Team};
pub use entity::{Entity, EntityFactory, EntityId, Motion, StandardFactory};
pub use deposit::{DepositId, ResourceDeposit};
pub use registry::{EntityRegistry, Partition, VisibilityFilter};
pub use aggregate::{TeamAggregate, TeamAggregates};
pub use map::{GameMap, MapDescriptor, TerrainTile};
pub use stats::RoundStats;
pub use signal::{Signal, SignalKind};
pub use dispatch::apply;
pub use round::{advance_round, RoundResult};
pub use state::{WorldState, INITIAL_ROUND};
pub use snapshot::SharedWorld;
