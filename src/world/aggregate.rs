//! Per-Team Aggregates
//!
//! Counters kept in step with the registry by the signal handlers so the
//! render layer never has to recount. Every value here must equal what a
//! full recount over the team's alive entities would give; `recount`
//! exists so tests can check exactly that.
//!
//! Archon and power-core references are stored as ids and resolved against
//! the registry on read.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::world::entity::{Entity, EntityId};
use crate::world::types::{ComponentClass, ComponentType, RobotType, Team};

/// Derived counters for one team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    /// Installed components by type. May hold entries at zero.
    component_counts: BTreeMap<ComponentType, i32>,

    /// Alive entities by chassis. May hold entries at zero.
    chassis_counts: BTreeMap<RobotType, i32>,

    /// Sum of health over alive entities
    total_health: f64,

    /// Archon ids in spawn order
    archons: Vec<EntityId>,

    /// Designated power core
    power_core: Option<EntityId>,
}

impl TeamAggregate {
    /// Chassis counts with non-positive entries hidden.
    pub fn chassis_counts(&self) -> BTreeMap<RobotType, i32> {
        self.chassis_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(robot_type, count)| (*robot_type, *count))
            .collect()
    }

    /// Live count for one chassis type.
    pub fn chassis_count(&self, robot_type: RobotType) -> i32 {
        self.chassis_counts.get(&robot_type).copied().unwrap_or(0).max(0)
    }

    /// Component counts, optionally restricted to one class.
    /// Non-positive entries are hidden.
    pub fn component_counts(&self, class: Option<ComponentClass>) -> BTreeMap<ComponentType, i32> {
        self.component_counts
            .iter()
            .filter(|(component, count)| **count > 0 && class.map_or(true, |c| component.class() == c))
            .map(|(component, count)| (*component, *count))
            .collect()
    }

    /// Installed count for one component type.
    pub fn component_count(&self, component: ComponentType) -> i32 {
        self.component_counts.get(&component).copied().unwrap_or(0).max(0)
    }

    /// Total health of the team.
    #[inline]
    pub fn total_health(&self) -> f64 {
        self.total_health
    }

    /// Archon ids in spawn order (may include dead, not-yet-swept archons).
    pub fn archon_ids(&self) -> &[EntityId] {
        &self.archons
    }

    /// Power core id.
    #[inline]
    pub fn power_core_id(&self) -> Option<EntityId> {
        self.power_core
    }

    // =========================================================================
    // Bookkeeping (called by the signal handlers)
    // =========================================================================

    /// Count a newly alive entity.
    pub fn add_entity(&mut self, entity: &Entity) {
        *self.chassis_counts.entry(entity.robot_type).or_insert(0) += 1;
        self.total_health += entity.health;
        for component in &entity.components {
            self.add_component(*component);
        }
    }

    /// Uncount an entity that died or changed team.
    pub fn remove_entity(&mut self, entity: &Entity) {
        *self.chassis_counts.entry(entity.robot_type).or_insert(0) -= 1;
        self.total_health -= entity.health;
        for component in &entity.components {
            *self.component_counts.entry(*component).or_insert(0) -= 1;
        }
    }

    /// Count an installed component.
    pub fn add_component(&mut self, component: ComponentType) {
        *self.component_counts.entry(component).or_insert(0) += 1;
    }

    /// Replace one entity's health contribution.
    pub fn replace_health(&mut self, old: f64, new: f64) {
        self.total_health -= old;
        self.total_health += new;
    }

    /// Append an archon.
    pub fn push_archon(&mut self, id: EntityId) {
        self.archons.push(id);
    }

    /// Set the power core.
    pub fn set_power_core(&mut self, id: Option<EntityId>) {
        self.power_core = id;
    }

    /// Drop references to an entity that left the registry.
    pub fn forget(&mut self, id: EntityId) {
        self.archons.retain(|archon| *archon != id);
        if self.power_core == Some(id) {
            self.power_core = None;
        }
    }

    /// Move an archon reference to another team's list.
    pub fn take_archon(&mut self, id: EntityId) -> bool {
        let before = self.archons.len();
        self.archons.retain(|archon| *archon != id);
        before != self.archons.len()
    }

    /// Keep only archons and power core that `resolves` accepts, preserving order.
    pub fn retain_references<F>(&mut self, mut resolves: F)
    where
        F: FnMut(EntityId) -> bool,
    {
        self.archons.retain(|id| resolves(*id));
        if let Some(core) = self.power_core {
            if !resolves(core) {
                self.power_core = None;
            }
        }
    }

    /// Recount from scratch over `entities`, using only alive members of `team`.
    ///
    /// Archon and power-core references are not derivable from the entities
    /// alone and are left empty.
    pub fn recount<'a, I>(team: Team, entities: I) -> Self
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut aggregate = Self::default();
        for entity in entities {
            if entity.team == team && entity.alive {
                aggregate.add_entity(entity);
            }
        }
        aggregate
    }

    /// Do the counters match `other` (ignoring references and hidden zero entries)?
    pub fn counters_match(&self, other: &Self) -> bool {
        self.chassis_counts() == other.chassis_counts()
            && self.component_counts(None) == other.component_counts(None)
            && (self.total_health - other.total_health).abs() < 1e-6
    }

    /// Hash this aggregate's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for (component, count) in &self.component_counts {
            hasher.update_u8(*component as u8);
            hasher.update_i32(*count);
        }
        for (robot_type, count) in &self.chassis_counts {
            hasher.update_u8(*robot_type as u8);
            hasher.update_i32(*count);
        }
        hasher.update_f64(self.total_health);
        for archon in &self.archons {
            hasher.update_u32(archon.0);
        }
        hasher.update_bool(self.power_core.is_some());
        if let Some(core) = self.power_core {
            hasher.update_u32(core.0);
        }
    }
}

/// Aggregates for both competing teams. Neutral entities are not tracked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregates {
    teams: [TeamAggregate; 2],
}

impl TeamAggregates {
    /// Aggregate for `team`, `None` for neutral.
    pub fn get(&self, team: Team) -> Option<&TeamAggregate> {
        team.index().map(|i| &self.teams[i])
    }

    /// Mutable aggregate for `team`, `None` for neutral.
    pub fn get_mut(&mut self, team: Team) -> Option<&mut TeamAggregate> {
        team.index().map(move |i| &mut self.teams[i])
    }

    /// Both aggregates, team A first.
    pub fn iter(&self) -> impl Iterator<Item = (Team, &TeamAggregate)> {
        Team::COMPETITORS.into_iter().zip(self.teams.iter())
    }

    /// Mutable access to both aggregates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TeamAggregate> {
        self.teams.iter_mut()
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.teams = Default::default();
    }
}

// =============================================================================
// TESTS
// =============================================================================
