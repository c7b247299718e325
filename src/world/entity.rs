//! Entity Records
//!
//! The plain core record for a unit or structure, its per-round tick,
//! and the construction capability that lets a render layer decide how
//! records are built and copied.
//!
//! Render-only decoration (sprites, animation clocks) belongs in a
//! separate structure keyed by [`EntityId`]; it never lives here.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::location::{Direction, MapLocation};
use crate::world::types::{ComponentClass, ComponentType, RobotType, Team, TargetHeight};

/// Number of debug indicator string slots per entity.
pub const INDICATOR_SLOTS: usize = 3;

/// Number of concentric broadcast rings tracked per entity.
pub const BROADCAST_RINGS: u32 = 20;

const BROADCAST_MASK: u32 = (1 << BROADCAST_RINGS) - 1;

/// Rounds a teleport stays visible.
pub const TELEPORT_ROUNDS: u32 = 1;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Simulator-assigned entity id. Never reused while the entity is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TRANSIENT STATE
// =============================================================================

/// How the entity last changed location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Motion {
    /// Not moving this round
    #[default]
    Idle,
    /// Moved to an adjacent cell along its facing
    Slide {
        /// Forward along the facing, or backing up
        forward: bool,
    },
    /// Jumped to a non-adjacent cell
    Teleport {
        /// Cell left behind
        from: MapLocation,
        /// Cell landed on
        to: MapLocation,
    },
}

impl Motion {
    fn hash_into(&self, hasher: &mut StateHasher) {
        match *self {
            Motion::Idle => hasher.update_u8(0),
            Motion::Slide { forward } => {
                hasher.update_u8(1);
                hasher.update_bool(forward);
            }
            Motion::Teleport { from, to } => {
                hasher.update_u8(2);
                hasher.update_location(from);
                hasher.update_location(to);
            }
        }
    }
}

/// Target of the most recent attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTarget {
    /// Targeted cell
    pub location: MapLocation,
    /// Ground or air
    pub height: TargetHeight,
}

// =============================================================================
// ENTITY
// =============================================================================

/// A live unit or structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique id
    pub id: EntityId,

    /// Chassis type (fixes the partition)
    pub robot_type: RobotType,

    /// Current owner; changes on capture
    pub team: Team,

    /// Current cell
    pub location: MapLocation,

    /// Current facing
    pub direction: Direction,

    /// Current health
    pub health: f64,

    /// Health ceiling
    pub max_health: f64,

    /// Shield points on top of health
    pub shield: f64,

    /// Carried flux
    pub flux: f64,

    /// Installed components, in install order
    pub components: Vec<ComponentType>,

    /// Powered on?
    pub powered: bool,

    /// Cleared by a death signal; the round sweep removes dead entities
    pub alive: bool,

    /// Carried by another unit (hidden but still registered)
    pub in_transport: bool,

    /// Broadcast radius derived from the best comm component
    pub broadcast_radius: f64,

    /// One bit per broadcast ring; bit 0 is this round's broadcast
    pub broadcast_rings: u32,

    /// Target of this round's attack
    pub attack: Option<AttackTarget>,

    /// This round's movement
    pub motion: Motion,

    /// Rounds left on the teleport marker
    pub teleport_rounds: u32,

    /// Debug strings set by the player's code
    pub indicator_strings: [Option<String>; INDICATOR_SLOTS],

    /// Opaque bits for external debug tooling
    pub control_bits: u64,

    /// Bytecodes used last round
    pub bytecodes_used: u32,
}

impl Entity {
    /// Create an entity at spawn defaults for its type.
    pub fn new(robot_type: RobotType, team: Team, id: EntityId) -> Self {
        let max_health = robot_type.max_health();
        Self {
            id,
            robot_type,
            team,
            location: MapLocation::default(),
            direction: Direction::North,
            health: max_health,
            max_health,
            shield: 0.0,
            flux: 0.0,
            components: Vec::new(),
            powered: true,
            alive: true,
            in_transport: false,
            broadcast_radius: 0.0,
            broadcast_rings: 0,
            attack: None,
            motion: Motion::Idle,
            teleport_rounds: 0,
            indicator_strings: Default::default(),
            control_bits: 0,
            bytecodes_used: 0,
        }
    }

    /// Does this entity live in the airborne partition?
    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.robot_type.is_airborne()
    }

    /// Did this entity broadcast this round?
    #[inline]
    pub fn is_broadcasting(&self) -> bool {
        self.broadcast_rings & 1 != 0
    }

    /// Is an attack marker showing?
    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.attack.is_some()
    }

    /// Mark as dead. Removal happens at the next round sweep.
    pub fn destroy(&mut self) {
        self.alive = false;
    }

    /// Record an attack on `location` at `height`.
    pub fn set_attacking(&mut self, location: MapLocation, height: TargetHeight) {
        self.attack = Some(AttackTarget { location, height });
    }

    /// Start a new broadcast ring.
    pub fn set_broadcast(&mut self) {
        self.broadcast_rings |= 1;
    }

    /// Install a component. Comm components may widen the broadcast radius.
    pub fn add_component(&mut self, component: ComponentType) {
        self.components.push(component);
        if component.class() == ComponentClass::Comm {
            self.update_broadcast_radius(component.range());
        }
    }

    /// Widen the broadcast radius to cover `range_squared`.
    pub fn update_broadcast_radius(&mut self, range_squared: u32) {
        let radius = f64::from(range_squared).sqrt();
        if radius > self.broadcast_radius {
            self.broadcast_radius = radius;
        }
    }

    /// Move without a movement classification.
    pub fn set_location(&mut self, location: MapLocation) {
        self.location = location;
    }

    /// Move to an adjacent cell along the current facing.
    pub fn set_sliding(&mut self, location: MapLocation, forward: bool) {
        self.location = location;
        self.motion = Motion::Slide { forward };
    }

    /// Jump to a non-adjacent cell.
    pub fn set_teleport(&mut self, location: MapLocation) {
        self.motion = Motion::Teleport { from: self.location, to: location };
        self.location = location;
        self.teleport_rounds = TELEPORT_ROUNDS;
    }

    /// Store a debug string. Out-of-range slots are ignored; returns whether it was stored.
    pub fn set_indicator_string(&mut self, slot: usize, text: String) -> bool {
        match self.indicator_strings.get_mut(slot) {
            Some(entry) => {
                *entry = Some(text);
                true
            }
            None => false,
        }
    }

    /// Board a transport.
    pub fn load(&mut self) {
        self.in_transport = true;
    }

    /// Leave a transport at `location`.
    pub fn unload(&mut self, location: MapLocation) {
        self.in_transport = false;
        self.location = location;
    }

    /// Per-round tick. Returns whether the entity is still alive.
    ///
    /// Clears one-round markers and shifts broadcast rings outward.
    pub fn update_round(&mut self) -> bool {
        self.attack = None;
        self.broadcast_rings = (self.broadcast_rings << 1) & BROADCAST_MASK;
        if self.teleport_rounds > 0 {
            self.teleport_rounds -= 1;
        }
        if self.teleport_rounds == 0 {
            self.motion = Motion::Idle;
        }
        self.alive
    }

    /// Hash this entity's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.robot_type as u8);
        hasher.update_u8(self.team as u8);
        hasher.update_location(self.location);
        hasher.update_u8(self.direction as u8);
        hasher.update_f64(self.health);
        hasher.update_f64(self.max_health);
        hasher.update_f64(self.shield);
        hasher.update_f64(self.flux);
        hasher.update_u32(self.components.len() as u32);
        for component in &self.components {
            hasher.update_u8(*component as u8);
        }
        hasher.update_bool(self.powered);
        hasher.update_bool(self.alive);
        hasher.update_bool(self.in_transport);
        hasher.update_f64(self.broadcast_radius);
        hasher.update_u32(self.broadcast_rings);
        match self.attack {
            Some(target) => {
                hasher.update_bool(true);
                hasher.update_location(target.location);
                hasher.update_u8(target.height as u8);
            }
            None => hasher.update_bool(false),
        }
        self.motion.hash_into(hasher);
        hasher.update_u32(self.teleport_rounds);
        hasher.update_u64(self.control_bits);
        hasher.update_u32(self.bytecodes_used);
        for slot in &self.indicator_strings {
            hasher.update_str(slot.as_deref().unwrap_or(""));
        }
    }
}

// =============================================================================
// CONSTRUCTION CAPABILITY
// =============================================================================

/// Builds and copies entity records on behalf of the world state.
///
/// Implemented by the render layer so it can attach its own bookkeeping
/// whenever a record is built or copied.
pub trait EntityFactory: Send + Sync {
    /// Build a fresh entity for a spawn signal.
    fn create(&self, robot_type: RobotType, team: Team, id: EntityId) -> Entity;

    /// Produce an independent deep copy of `entity`.
    fn copy(&self, entity: &Entity) -> Entity {
        entity.clone()
    }
}

/// Factory that builds entities with the stock per-type defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFactory;

impl EntityFactory for StandardFactory {
    fn create(&self, robot_type: RobotType, team: Team, id: EntityId) -> Entity {
        Entity::new(robot_type, team, id)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn soldier() -> Entity {
        Entity::new(RobotType::Soldier, Team::A, EntityId(1))
    }

    #[test]
    fn test_spawn_defaults() {
        let e = soldier();
        assert_eq!(e.health, RobotType::Soldier.max_health());
        assert!(e.alive);
        assert!(e.powered);
        assert!(e.components.is_empty());
        assert_eq!(e.motion, Motion::Idle);
    }

    #[test]
    fn test_broadcast_rings_shift() {
        let mut e = soldier();
        e.set_broadcast();
        assert!(e.is_broadcasting());

        e.update_round();
        assert!(!e.is_broadcasting());
        assert_eq!(e.broadcast_rings, 0b10);

        for _ in 0..BROADCAST_RINGS {
            e.update_round();
        }
        assert_eq!(e.broadcast_rings, 0);
    }

    #[test]
    fn test_comm_component_widens_radius() {
        let mut e = soldier();
        e.add_component(ComponentType::Dish);
        assert_eq!(e.broadcast_radius, 12.0);

        // Smaller antenna does not shrink it
        e.add_component(ComponentType::Antenna);
        assert_eq!(e.broadcast_radius, 12.0);

        // Non-comm components leave it alone
        e.add_component(ComponentType::Railgun);
        assert_eq!(e.broadcast_radius, 12.0);
        assert_eq!(e.components.len(), 3);
    }

    #[test]
    fn test_teleport_marker_lasts_one_round() {
        let mut e = soldier();
        e.set_location(MapLocation::new(2, 3));
        e.set_teleport(MapLocation::new(9, 9));
        assert_eq!(
            e.motion,
            Motion::Teleport { from: MapLocation::new(2, 3), to: MapLocation::new(9, 9) }
        );
        assert_eq!(e.location, MapLocation::new(9, 9));

        e.update_round();
        assert_eq!(e.motion, Motion::Idle);
    }

    #[test]
    fn test_tick_reports_alive() {
        let mut e = soldier();
        e.set_attacking(MapLocation::new(1, 1), TargetHeight::InAir);
        assert!(e.update_round());
        assert!(!e.is_attacking());

        e.destroy();
        assert!(!e.update_round());
    }

    #[test]
    fn test_indicator_slots() {
        let mut e = soldier();
        assert!(e.set_indicator_string(0, "hello".into()));
        assert!(!e.set_indicator_string(INDICATOR_SLOTS, "dropped".into()));
        assert_eq!(e.indicator_strings[0].as_deref(), Some("hello"));
    }

    #[test]
    fn test_factory_copy_is_independent() {
        let factory = StandardFactory;
        let source = factory.create(RobotType::Archon, Team::B, EntityId(9));
        let mut copy = factory.copy(&source);
        copy.health = 1.0;
        copy.components.push(ComponentType::Shield);
        assert_eq!(source.health, RobotType::Archon.max_health());
        assert!(source.components.is_empty());
    }

    fn digest(e: &Entity) -> crate::core::hash::StateHash {
        let mut hasher = StateHasher::new(b"test");
        e.hash_into(&mut hasher);
        hasher.finalize()
    }

    #[test]
    fn test_hash_covers_transient_markers() {
        let base = soldier();

        let mut attacking = base.clone();
        attacking.set_attacking(MapLocation::new(4, 4), TargetHeight::OnGround);
        assert_ne!(digest(&base), digest(&attacking));

        let mut air_attack = base.clone();
        air_attack.set_attacking(MapLocation::new(4, 4), TargetHeight::InAir);
        assert_ne!(digest(&attacking), digest(&air_attack));

        let mut forward = base.clone();
        forward.set_sliding(MapLocation::new(0, 1), true);
        let mut backward = base.clone();
        backward.set_sliding(MapLocation::new(0, 1), false);
        assert_ne!(digest(&forward), digest(&backward));

        let mut teleported = base.clone();
        teleported.set_teleport(MapLocation::new(0, 1));
        assert_ne!(digest(&forward), digest(&teleported));

        let mut lingering = teleported.clone();
        lingering.teleport_rounds += 1;
        assert_ne!(digest(&teleported), digest(&lingering));

        let mut wide = base.clone();
        wide.broadcast_radius = 20.0;
        assert_ne!(digest(&base), digest(&wide));
    }
}
