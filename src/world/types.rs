//! Game Vocabulary
//!
//! Teams, chassis types and components as named by the simulator.
//! These are static tables; nothing here changes during a match.

use serde::{Serialize, Deserialize};

// =============================================================================
// TEAM
// =============================================================================

/// Team affiliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Team {
    /// First competitor
    A = 0,
    /// Second competitor
    B = 1,
    /// Unowned (debris, uncaptured nodes)
    Neutral = 2,
}

impl Team {
    /// The two competing teams.
    pub const COMPETITORS: [Team; 2] = [Team::A, Team::B];

    /// Index into per-team arrays, `None` for neutral.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Team::A => Some(0),
            Team::B => Some(1),
            Team::Neutral => None,
        }
    }

    /// The other competitor. Neutral stays neutral.
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
            Team::Neutral => Team::Neutral,
        }
    }
}

// =============================================================================
// CHASSIS
// =============================================================================

/// Unit or structure type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RobotType {
    /// Flying commander; tracked per team
    Archon = 0,
    /// Flux harvester
    Wout = 1,
    /// General-purpose ground fighter
    Soldier = 2,
    /// Heavy ground unit with splash attacks
    Chainer = 3,
    /// Slow ground unit with long-range weapons
    Turret = 4,
    /// Fast flying scout
    Scout = 5,
    /// Ground unit that slows enemy actions
    Disrupter = 6,
    /// Static defensive structure
    Tower = 7,
    /// Team power core; airborne-classified structure
    PowerNode = 8,
}

impl RobotType {
    /// All chassis types.
    pub const ALL: [RobotType; 9] = [
        RobotType::Archon,
        RobotType::Wout,
        RobotType::Soldier,
        RobotType::Chainer,
        RobotType::Turret,
        RobotType::Scout,
        RobotType::Disrupter,
        RobotType::Tower,
        RobotType::PowerNode,
    ];

    /// Does this type live in the airborne partition?
    pub fn is_airborne(self) -> bool {
        matches!(self, RobotType::Archon | RobotType::Scout | RobotType::PowerNode)
    }

    /// Is this the archon class tracked in per-team archon lists?
    #[inline]
    pub fn is_archon(self) -> bool {
        self == RobotType::Archon
    }

    /// Is this the power-core structure tracked per team?
    #[inline]
    pub fn is_power_core(self) -> bool {
        self == RobotType::PowerNode
    }

    /// Is this a stationary structure (capturable)?
    pub fn is_structure(self) -> bool {
        matches!(self, RobotType::Tower | RobotType::PowerNode)
    }

    /// Health at spawn.
    pub fn max_health(self) -> f64 {
        match self {
            RobotType::Archon => 75.0,
            RobotType::Wout => 30.0,
            RobotType::Soldier => 40.0,
            RobotType::Chainer => 50.0,
            RobotType::Turret => 60.0,
            RobotType::Scout => 20.0,
            RobotType::Disrupter => 45.0,
            RobotType::Tower => 100.0,
            RobotType::PowerNode => 200.0,
        }
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

/// Broad component category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentClass {
    /// Extra health and damage reduction
    Armor,
    /// Attacks other entities
    Weapon,
    /// Communications; sets broadcast radius
    Comm,
    /// Extends vision
    Sensor,
    /// Builds units and structures
    Builder,
    /// Anything else
    Misc,
}

/// Installable component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Absorbs a fixed amount per hit
    Shield,
    /// Caps damage per hit
    Hardened,
    /// Adds health
    Plating,
    /// Short-range rapid fire
    Smg,
    /// Medium-range weapon
    Blaster,
    /// Long-range heavy weapon
    Railgun,
    /// Repairs nearby allies
    Medic,
    /// Short-range comm
    Antenna,
    /// Medium-range comm
    Dish,
    /// Long-range comm
    Network,
    /// Basic sensor
    Sight,
    /// Wide-angle sensor
    Radar,
    /// Narrow long-range sensor
    Telescope,
    /// Builds structures
    Constructor,
    /// Builds units from flux
    Recycler,
    /// Extra bytecodes per round
    Processor,
    /// Lets the unit jump over cells
    Jump,
}

impl ComponentType {
    /// Category of this component.
    pub fn class(self) -> ComponentClass {
        use ComponentType::*;
        match self {
            Shield | Hardened | Plating => ComponentClass::Armor,
            Smg | Blaster | Railgun | Medic => ComponentClass::Weapon,
            Antenna | Dish | Network => ComponentClass::Comm,
            Sight | Radar | Telescope => ComponentClass::Sensor,
            Constructor | Recycler => ComponentClass::Builder,
            Processor | Jump => ComponentClass::Misc,
        }
    }

    /// Squared range of the component's effect, 0 when it has none.
    pub fn range(self) -> u32 {
        use ComponentType::*;
        match self {
            Smg => 9,
            Blaster => 16,
            Railgun => 36,
            Medic => 9,
            Antenna => 64,
            Dish => 144,
            Network => 400,
            Sight => 9,
            Radar => 36,
            Telescope => 144,
            Constructor | Recycler => 2,
            Jump => 16,
            Shield | Hardened | Plating | Processor => 0,
        }
    }
}

// =============================================================================
// ELEVATION
// =============================================================================

/// Elevation a target sits at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetHeight {
    /// Buried mine layer
    Mine,
    #[default]
    /// Ground level
    OnGround,
    /// Airborne
    InAir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_index() {
        assert_eq!(Team::A.index(), Some(0));
        assert_eq!(Team::B.index(), Some(1));
        assert_eq!(Team::Neutral.index(), None);
        assert_eq!(Team::A.opponent(), Team::B);
    }

    #[test]
    fn test_power_core_is_airborne() {
        assert!(RobotType::PowerNode.is_airborne());
        assert!(RobotType::PowerNode.is_power_core());
        assert!(RobotType::PowerNode.is_structure());
        assert!(!RobotType::Soldier.is_airborne());
    }

    #[test]
    fn test_component_classes() {
        assert_eq!(ComponentType::Antenna.class(), ComponentClass::Comm);
        assert_eq!(ComponentType::Railgun.class(), ComponentClass::Weapon);
        assert!(ComponentType::Network.range() > ComponentType::Dish.range());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RobotType::PowerNode).unwrap();
        assert_eq!(json, "\"POWER_NODE\"");
        let team: Team = serde_json::from_str("\"NEUTRAL\"").unwrap();
        assert_eq!(team, Team::Neutral);
    }
}
