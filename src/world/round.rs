//! Round Advancement
//!
//! Once per simulated round: bump the counter, tick every entity and sweep
//! the ones that report not-alive. Archon and power-core references to swept
//! entities are dropped in the same pass so they never dangle.

use tracing::debug;

use crate::world::entity::Entity;
use crate::world::state::WorldState;

/// Result of advancing one round.
#[derive(Debug, Default)]
pub struct RoundResult {
    /// Round number after the advance
    pub round: i32,
    /// Entities swept this round, in registry order
    pub removed: Vec<Entity>,
}

/// Advance `state` by one round.
pub fn advance_round(state: &mut WorldState) -> RoundResult {
    state.round += 1;

    let removed = state.registry.sweep(Entity::update_round);
    // A captured power core stays referenced by its previous team
    for entity in &removed {
        for agg in state.aggregates.iter_mut() {
            agg.forget(entity.id);
        }
    }

    if !removed.is_empty() {
        debug!(round = state.round, swept = removed.len(), "round advanced");
    }

    RoundResult { round: state.round, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::core::location::{Direction, MapLocation};
    use crate::world::dispatch::apply;
    use crate::world::entity::EntityId;
    use crate::world::map::GameMap;
    use crate::world::signal::Signal;
    use crate::world::state::INITIAL_ROUND;
    use crate::world::types::{RobotType, Team};

    fn new_state() -> WorldState {
        WorldState::create(GameMap::open(8, 8, MapLocation::default()).unwrap())
    }

    fn spawn(state: &mut WorldState, id: u32, robot_type: RobotType, team: Team) {
        let signal = Signal::Spawn {
            robot_id: EntityId(id),
            robot_type,
            team,
            loc: MapLocation::new(1, 1),
            direction: Direction::East,
        };
        apply(state, &signal, &DispatchConfig::default()).unwrap();
    }

    #[test]
    fn test_round_counter() {
        let mut state = new_state();
        for n in 1..=5 {
            let result = advance_round(&mut state);
            assert_eq!(result.round, INITIAL_ROUND + n);
        }
        assert_eq!(state.current_round(), INITIAL_ROUND + 5);
    }

    #[test]
    fn test_dead_removed_and_never_return() {
        let mut state = new_state();
        spawn(&mut state, 1, RobotType::Soldier, Team::A);
        spawn(&mut state, 2, RobotType::Scout, Team::B);
        apply(&mut state, &Signal::Death { object_id: EntityId(2) }, &DispatchConfig::default()).unwrap();

        let result = advance_round(&mut state);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].id, EntityId(2));

        for _ in 0..3 {
            advance_round(&mut state);
            assert!(state.find(EntityId(2)).is_none());
        }
        assert!(state.find(EntityId(1)).is_some());
    }

    #[test]
    fn test_sweep_prunes_power_core() {
        let mut state = new_state();
        spawn(&mut state, 1, RobotType::PowerNode, Team::B);
        apply(&mut state, &Signal::Death { object_id: EntityId(1) }, &DispatchConfig::default()).unwrap();

        // Still reported until the sweep
        assert!(state.power_core(Team::B).is_some());
        advance_round(&mut state);
        assert!(state.power_core(Team::B).is_none());
        assert_eq!(state.aggregate(Team::B).unwrap().power_core_id(), None);
    }

    #[test]
    fn test_markers_cleared_by_tick() {
        let mut state = new_state();
        spawn(&mut state, 1, RobotType::Soldier, Team::A);
        let attack = Signal::Attack {
            robot_id: EntityId(1),
            target_loc: MapLocation::new(2, 2),
            target_height: Default::default(),
        };
        apply(&mut state, &attack, &DispatchConfig::default()).unwrap();
        assert!(state.lookup(EntityId(1)).unwrap().is_attacking());

        advance_round(&mut state);
        assert!(!state.lookup(EntityId(1)).unwrap().is_attacking());
    }
}
