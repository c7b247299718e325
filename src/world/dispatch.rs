//! Signal Dispatcher
//!
//! Applies one signal to the world state. There is one handler per signal
//! tag; `apply` matches on the tag exhaustively.
//!
//! # Contract
//!
//! The signal stream is a trusted, ordered log. Every id a signal names must
//! resolve; if one does not, the signal is rejected with a
//! [`ContractViolation`] and the caller should stop replaying that stream.
//! A rejected signal leaves the state untouched: batch signals check every
//! id before changing anything.
//!
//! # Aggregates
//!
//! Team aggregates always equal a recount over alive entities. A dead entity
//! stays registered until the next round sweep, but it no longer counts:
//! later health changes or installs on it update the entity only.

use tracing::{debug, warn};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::DispatchConfig;
use crate::core::location::{Direction, MapLocation};
use crate::error::{ContractViolation, StateError};
use crate::world::deposit::{DepositId, ResourceDeposit};
use crate::world::entity::EntityId;
use crate::world::signal::Signal;
use crate::world::state::WorldState;
use crate::world::types::{ComponentType, RobotType, TargetHeight, Team};

/// Apply `signal` to `state`.
///
/// # Errors
///
/// Returns a [`ContractViolation`] wrapping `EntityNotFound`/`DepositNotFound`
/// when a referenced id is not registered, or `DuplicateEntity`/`DuplicateDeposit`
/// when a birth names an id already in use.
pub fn apply(
    state: &mut WorldState,
    signal: &Signal,
    config: &DispatchConfig,
) -> Result<(), ContractViolation> {
    #[cfg(feature = "debug-tracing")]
    trace!(round = state.round, ?signal, "applying signal");

    let result = match signal {
        Signal::Attack { robot_id, target_loc, target_height } => {
            apply_attack(state, *robot_id, *target_loc, *target_height)
        }
        Signal::Broadcast { robot_id } => apply_broadcast(state, *robot_id),
        Signal::Death { object_id } => apply_death(state, *object_id),
        Signal::EnergonChange { changes } => apply_energon_change(state, changes),
        Signal::FluxChange { changes } => apply_flux_change(state, changes),
        Signal::IndicatorString { robot_id, index, text } => {
            apply_indicator_string(state, *robot_id, *index, text, config)
        }
        Signal::ControlBits { robot_id, bits } => apply_control_bits(state, *robot_id, *bits),
        Signal::MovementOverride { robot_id, new_loc } => {
            apply_movement_override(state, *robot_id, *new_loc)
        }
        Signal::Movement { robot_id, new_loc, moving_forward } => {
            apply_movement(state, *robot_id, *new_loc, *moving_forward)
        }
        Signal::Equip { robot_id, component } => apply_equip(state, *robot_id, *component),
        Signal::SetDirection { robot_id, direction } => {
            apply_set_direction(state, *robot_id, *direction)
        }
        Signal::Spawn { robot_id, robot_type, team, loc, direction } => {
            apply_spawn(state, *robot_id, *robot_type, *team, *loc, *direction)
        }
        Signal::BytecodesUsed { changes } => apply_bytecodes_used(state, changes),
        Signal::Load { passenger_id } => apply_load(state, *passenger_id),
        Signal::Unload { passenger_id, unload_loc } => {
            apply_unload(state, *passenger_id, *unload_loc)
        }
        Signal::DepositBirth { deposit_id, loc, rounds_available } => {
            apply_deposit_birth(state, *deposit_id, *loc, *rounds_available)
        }
        Signal::DepositDepletion { deposit_id, rounds_available } => {
            apply_deposit_depletion(state, *deposit_id, *rounds_available)
        }
        Signal::TeamCapture { robot_id, new_team } => {
            apply_team_capture(state, *robot_id, *new_team)
        }
        Signal::PowerOn { robot_ids } => apply_power_on(state, robot_ids),
        Signal::PowerOff { robot_id } => apply_power_off(state, *robot_id),
    };

    result.map_err(|source| ContractViolation::new(signal.kind(), source))
}

/// Fail unless every id resolves.
fn require_all<I>(state: &WorldState, ids: I) -> Result<(), StateError>
where
    I: IntoIterator<Item = EntityId>,
{
    for id in ids {
        state.registry.lookup(id)?;
    }
    Ok(())
}

// =============================================================================
// MARKERS
// =============================================================================

fn apply_attack(
    state: &mut WorldState,
    id: EntityId,
    target: MapLocation,
    height: TargetHeight,
) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.set_attacking(target, height);
    Ok(())
}

fn apply_broadcast(state: &mut WorldState, id: EntityId) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.set_broadcast();
    Ok(())
}

fn apply_indicator_string(
    state: &mut WorldState,
    id: EntityId,
    slot: usize,
    text: &str,
    config: &DispatchConfig,
) -> Result<(), StateError> {
    let entity = state.registry.lookup_mut(id)?;
    if config.tournament_mode {
        return Ok(());
    }
    if !entity.set_indicator_string(slot, text.to_owned()) {
        warn!(id = %id, slot, "indicator string slot out of range");
    }
    Ok(())
}

fn apply_control_bits(state: &mut WorldState, id: EntityId, bits: u64) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.control_bits = bits;
    Ok(())
}

fn apply_bytecodes_used(
    state: &mut WorldState,
    changes: &[(EntityId, u32)],
) -> Result<(), StateError> {
    require_all(state, changes.iter().map(|(id, _)| *id))?;
    for (id, bytecodes) in changes {
        state.registry.lookup_mut(*id)?.bytecodes_used = *bytecodes;
    }
    Ok(())
}

// =============================================================================
// LIFECYCLE
// =============================================================================

fn apply_spawn(
    state: &mut WorldState,
    id: EntityId,
    robot_type: RobotType,
    team: Team,
    location: MapLocation,
    direction: Direction,
) -> Result<(), StateError> {
    if state.registry.contains(id) {
        return Err(StateError::DuplicateEntity(id));
    }

    let mut entity = state.factory.create(robot_type, team, id);
    entity.location = location;
    entity.direction = direction;

    if let Some(agg) = state.aggregates.get_mut(team) {
        if robot_type.is_power_core() {
            agg.set_power_core(Some(id));
        }
        if robot_type.is_archon() {
            agg.push_archon(id);
        }
        agg.add_entity(&entity);
    }

    debug!(id = %id, ?robot_type, ?team, %location, "spawned");
    state.registry.insert(entity)
}

fn apply_death(state: &mut WorldState, id: EntityId) -> Result<(), StateError> {
    let entity = state.registry.lookup_mut(id)?;
    if !entity.alive {
        warn!(id = %id, "death for an entity already dead, ignoring");
        return Ok(());
    }
    entity.destroy();

    if let Some(agg) = state.aggregates.get_mut(entity.team) {
        agg.remove_entity(entity);
    }
    debug!(id = %id, robot_type = ?entity.robot_type, "died");
    Ok(())
}

fn apply_team_capture(state: &mut WorldState, id: EntityId, new_team: Team) -> Result<(), StateError> {
    let entity = state.registry.lookup_mut(id)?;
    let old_team = entity.team;
    if old_team == new_team {
        return Ok(());
    }

    if entity.alive {
        if let Some(agg) = state.aggregates.get_mut(old_team) {
            agg.remove_entity(entity);
        }
    } else {
        warn!(id = %id, "capture of a dead entity");
    }

    entity.team = new_team;

    if entity.alive {
        if let Some(agg) = state.aggregates.get_mut(new_team) {
            agg.add_entity(entity);
        }
    }

    let moved_archon = state
        .aggregates
        .get_mut(old_team)
        .map_or(false, |agg| agg.take_archon(id));
    if moved_archon {
        if let Some(agg) = state.aggregates.get_mut(new_team) {
            agg.push_archon(id);
        }
    }

    debug!(id = %id, from = ?old_team, to = ?new_team, "captured");
    Ok(())
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

fn apply_energon_change(
    state: &mut WorldState,
    changes: &[(EntityId, f64)],
) -> Result<(), StateError> {
    require_all(state, changes.iter().map(|(id, _)| *id))?;
    for (id, health) in changes {
        let entity = state.registry.lookup_mut(*id)?;
        let old = entity.health;
        entity.health = *health;

        if entity.alive {
            if let Some(agg) = state.aggregates.get_mut(entity.team) {
                agg.replace_health(old, *health);
            }
        } else {
            warn!(id = %id, "health change on a dead entity");
        }
    }
    Ok(())
}

fn apply_flux_change(state: &mut WorldState, changes: &[(EntityId, f64)]) -> Result<(), StateError> {
    require_all(state, changes.iter().map(|(id, _)| *id))?;
    for (id, flux) in changes {
        state.registry.lookup_mut(*id)?.flux = *flux;
    }
    Ok(())
}

fn apply_equip(state: &mut WorldState, id: EntityId, component: ComponentType) -> Result<(), StateError> {
    let entity = state.registry.lookup_mut(id)?;
    entity.add_component(component);

    if entity.alive {
        if let Some(agg) = state.aggregates.get_mut(entity.team) {
            agg.add_component(component);
        }
    } else {
        warn!(id = %id, ?component, "equip on a dead entity");
    }
    Ok(())
}

fn apply_set_direction(state: &mut WorldState, id: EntityId, direction: Direction) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.direction = direction;
    Ok(())
}

fn apply_power_on(state: &mut WorldState, ids: &[EntityId]) -> Result<(), StateError> {
    require_all(state, ids.iter().copied())?;
    for id in ids {
        state.registry.lookup_mut(*id)?.powered = true;
    }
    Ok(())
}

fn apply_power_off(state: &mut WorldState, id: EntityId) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.powered = false;
    Ok(())
}

// =============================================================================
// MOVEMENT
// =============================================================================

fn apply_movement_override(state: &mut WorldState, id: EntityId, location: MapLocation) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.set_location(location);
    Ok(())
}

fn apply_movement(
    state: &mut WorldState,
    id: EntityId,
    location: MapLocation,
    forward: bool,
) -> Result<(), StateError> {
    let entity = state.registry.lookup_mut(id)?;
    if entity.location.is_adjacent_to(location) {
        entity.set_sliding(location, forward);
    } else {
        debug!(id = %id, from = %entity.location, to = %location, "teleported");
        entity.set_teleport(location);
    }
    Ok(())
}

fn apply_load(state: &mut WorldState, id: EntityId) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.load();
    Ok(())
}

fn apply_unload(state: &mut WorldState, id: EntityId, location: MapLocation) -> Result<(), StateError> {
    state.registry.lookup_mut(id)?.unload(location);
    Ok(())
}

// =============================================================================
// DEPOSITS
// =============================================================================

fn apply_deposit_birth(
    state: &mut WorldState,
    id: DepositId,
    location: MapLocation,
    rounds: u32,
) -> Result<(), StateError> {
    state.registry.insert_deposit(ResourceDeposit::new(id, location, rounds))
}

fn apply_deposit_depletion(state: &mut WorldState, id: DepositId, rounds: u32) -> Result<(), StateError> {
    state.registry.deposit_mut(id)?.rounds_remaining = rounds;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
