//! Simulation Signals
//!
//! One variant per state change the simulator reports. The set is closed:
//! the dispatcher matches on it exhaustively.
//!
//! Serialized with an internal `type` tag in snake_case, e.g.
//! `{"type": "death", "object_id": 7}`.

use serde::{Serialize, Deserialize};

use crate::core::location::{Direction, MapLocation};
use crate::world::deposit::DepositId;
use crate::world::entity::EntityId;
use crate::world::types::{ComponentType, RobotType, TargetHeight, Team};

/// A single ordered world-state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Entity attacked a location
    Attack {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Targeted cell
        target_loc: MapLocation,
        /// Ground or air target
        #[serde(default)]
        target_height: TargetHeight,
    },

    /// Entity broadcast a message
    Broadcast {
        /// Entity the signal is about
        robot_id: EntityId,
    },

    /// Entity died; removal happens at the next round sweep
    Death {
        /// Entity that died
        object_id: EntityId,
    },

    /// New health values
    EnergonChange {
        /// New health per entity
        changes: Vec<(EntityId, f64)>,
    },

    /// New flux values
    FluxChange {
        /// New flux per entity
        changes: Vec<(EntityId, f64)>,
    },

    /// Debug string set by player code
    IndicatorString {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Indicator slot
        index: usize,
        /// String to show
        text: String,
    },

    /// Opaque bits for debug tooling
    ControlBits {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Raw bit pattern
        bits: u64,
    },

    /// Forced relocation with no movement animation
    MovementOverride {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Destination cell
        new_loc: MapLocation,
    },

    /// Regular move
    Movement {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Destination cell
        new_loc: MapLocation,
        /// Moving along the facing rather than backing up
        moving_forward: bool,
    },

    /// Component installed
    Equip {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Installed component
        component: ComponentType,
    },

    /// Facing changed
    SetDirection {
        /// Entity the signal is about
        robot_id: EntityId,
        /// New facing
        direction: Direction,
    },

    /// Entity created
    Spawn {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Chassis type
        robot_type: RobotType,
        /// Owning team
        team: Team,
        /// Spawn cell
        loc: MapLocation,
        /// Initial facing
        #[serde(default)]
        direction: Direction,
    },

    /// Bytecodes used last round
    BytecodesUsed {
        /// Bytecodes used per entity
        changes: Vec<(EntityId, u32)>,
    },

    /// Entity boarded a transport
    Load {
        /// Transported entity
        passenger_id: EntityId,
    },

    /// Entity left a transport
    Unload {
        /// Transported entity
        passenger_id: EntityId,
        /// Drop-off cell
        unload_loc: MapLocation,
    },

    /// Resource deposit appeared
    DepositBirth {
        /// New deposit
        deposit_id: DepositId,
        /// Deposit cell
        loc: MapLocation,
        /// Rounds of resource left
        rounds_available: u32,
    },

    /// Resource deposit drained
    DepositDepletion {
        /// Deposit the signal is about
        deposit_id: DepositId,
        /// Rounds of resource left
        rounds_available: u32,
    },

    /// Structure recaptured
    TeamCapture {
        /// Entity the signal is about
        robot_id: EntityId,
        /// Team that now owns it
        new_team: Team,
    },

    /// Entities powered on
    PowerOn {
        /// Entities switched on
        robot_ids: Vec<EntityId>,
    },

    /// Entity powered off
    PowerOff {
        /// Entity the signal is about
        robot_id: EntityId,
    },
}

/// Tag of a [`Signal`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// [`Signal::Attack`]
    Attack,
    /// [`Signal::Broadcast`]
    Broadcast,
    /// [`Signal::Death`]
    Death,
    /// [`Signal::EnergonChange`]
    EnergonChange,
    /// [`Signal::FluxChange`]
    FluxChange,
    /// [`Signal::IndicatorString`]
    IndicatorString,
    /// [`Signal::ControlBits`]
    ControlBits,
    /// [`Signal::MovementOverride`]
    MovementOverride,
    /// [`Signal::Movement`]
    Movement,
    /// [`Signal::Equip`]
    Equip,
    /// [`Signal::SetDirection`]
    SetDirection,
    /// [`Signal::Spawn`]
    Spawn,
    /// [`Signal::BytecodesUsed`]
    BytecodesUsed,
    /// [`Signal::Load`]
    Load,
    /// [`Signal::Unload`]
    Unload,
    /// [`Signal::DepositBirth`]
    DepositBirth,
    /// [`Signal::DepositDepletion`]
    DepositDepletion,
    /// [`Signal::TeamCapture`]
    TeamCapture,
    /// [`Signal::PowerOn`]
    PowerOn,
    /// [`Signal::PowerOff`]
    PowerOff,
}

impl Signal {
    /// Tag of this signal.
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Attack { .. } => SignalKind::Attack,
            Signal::Broadcast { .. } => SignalKind::Broadcast,
            Signal::Death { .. } => SignalKind::Death,
            Signal::EnergonChange { .. } => SignalKind::EnergonChange,
            Signal::FluxChange { .. } => SignalKind::FluxChange,
            Signal::IndicatorString { .. } => SignalKind::IndicatorString,
            Signal::ControlBits { .. } => SignalKind::ControlBits,
            Signal::MovementOverride { .. } => SignalKind::MovementOverride,
            Signal::Movement { .. } => SignalKind::Movement,
            Signal::Equip { .. } => SignalKind::Equip,
            Signal::SetDirection { .. } => SignalKind::SetDirection,
            Signal::Spawn { .. } => SignalKind::Spawn,
            Signal::BytecodesUsed { .. } => SignalKind::BytecodesUsed,
            Signal::Load { .. } => SignalKind::Load,
            Signal::Unload { .. } => SignalKind::Unload,
            Signal::DepositBirth { .. } => SignalKind::DepositBirth,
            Signal::DepositDepletion { .. } => SignalKind::DepositDepletion,
            Signal::TeamCapture { .. } => SignalKind::TeamCapture,
            Signal::PowerOn { .. } => SignalKind::PowerOn,
            Signal::PowerOff { .. } => SignalKind::PowerOff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let signal: Signal = serde_json::from_str(r#"{"type": "death", "object_id": 7}"#).unwrap();
        assert_eq!(signal, Signal::Death { object_id: EntityId(7) });
        assert_eq!(signal.kind(), SignalKind::Death);
    }

    #[test]
    fn test_spawn_defaults_direction() {
        let signal: Signal = serde_json::from_str(
            r#"{"type": "spawn", "robot_id": 3, "robot_type": "ARCHON", "team": "A", "loc": {"x": 2, "y": 3}}"#,
        )
        .unwrap();
        match signal {
            Signal::Spawn { robot_type, direction, loc, .. } => {
                assert_eq!(robot_type, RobotType::Archon);
                assert_eq!(direction, Direction::North);
                assert_eq!(loc, MapLocation::new(2, 3));
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_batch_payload() {
        let signal: Signal = serde_json::from_str(
            r#"{"type": "energon_change", "changes": [[1, 10.5], [2, 0.0]]}"#,
        )
        .unwrap();
        assert_eq!(
            signal,
            Signal::EnergonChange { changes: vec![(EntityId(1), 10.5), (EntityId(2), 0.0)] }
        );
    }
}
