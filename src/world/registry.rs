//! Entity Registry
//!
//! Owns every registered entity, split into a surface and an airborne
//! partition, plus the deposit collection.
//!
//! Partitions are `IndexMap`s so iteration follows insertion order, which is
//! the draw order the render layer expects. An id is in at most one partition.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::StateError;
use crate::world::deposit::{DepositId, ResourceDeposit};
use crate::world::entity::{Entity, EntityId};

/// Which half of the registry an entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Ground units and ground structures
    Surface,
    /// Flying units and airborne structures
    Airborne,
}

impl Partition {
    /// Partition an entity of this shape belongs to.
    #[inline]
    pub fn of(entity: &Entity) -> Partition {
        if entity.is_airborne() {
            Partition::Airborne
        } else {
            Partition::Surface
        }
    }
}

/// Chooses which partitions `iter_live` walks.
pub trait VisibilityFilter {
    /// Should entities in `partition` be visited?
    fn shows(&self, partition: Partition) -> bool;
}

impl<F> VisibilityFilter for F
where
    F: Fn(Partition) -> bool,
{
    fn shows(&self, partition: Partition) -> bool {
        self(partition)
    }
}

/// Entity and deposit storage.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    surface: IndexMap<EntityId, Entity>,
    airborne: IndexMap<EntityId, Entity>,
    deposits: IndexMap<DepositId, ResourceDeposit>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity in the partition its type selects.
    pub fn insert(&mut self, entity: Entity) -> Result<(), StateError> {
        let id = entity.id;
        if self.contains(id) {
            return Err(StateError::DuplicateEntity(id));
        }
        self.partition_mut(Partition::of(&entity)).insert(id, entity);
        Ok(())
    }

    /// Unregister an entity, returning it.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, StateError> {
        self.surface
            .shift_remove(&id)
            .or_else(|| self.airborne.shift_remove(&id))
            .ok_or(StateError::EntityNotFound(id))
    }

    /// Look up an entity in either partition.
    pub fn lookup(&self, id: EntityId) -> Result<&Entity, StateError> {
        self.find(id).ok_or(StateError::EntityNotFound(id))
    }

    /// Look up an entity mutably in either partition.
    pub fn lookup_mut(&mut self, id: EntityId) -> Result<&mut Entity, StateError> {
        match self.surface.get_mut(&id) {
            Some(entity) => Ok(entity),
            None => self.airborne.get_mut(&id).ok_or(StateError::EntityNotFound(id)),
        }
    }

    /// Non-failing lookup.
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.surface.get(&id).or_else(|| self.airborne.get(&id))
    }

    /// Is `id` registered in either partition?
    pub fn contains(&self, id: EntityId) -> bool {
        self.surface.contains_key(&id) || self.airborne.contains_key(&id)
    }

    /// Which partition holds `id`, if any.
    pub fn partition_of(&self, id: EntityId) -> Option<Partition> {
        if self.surface.contains_key(&id) {
            Some(Partition::Surface)
        } else if self.airborne.contains_key(&id) {
            Some(Partition::Airborne)
        } else {
            None
        }
    }

    /// Iterate registered entities in the partitions `filter` admits.
    ///
    /// Surface entities come first, then airborne; each in insertion order.
    /// The iterator is lazy; call again to restart.
    pub fn iter_live<'a, V>(&'a self, filter: V) -> impl Iterator<Item = &'a Entity> + 'a
    where
        V: VisibilityFilter,
    {
        let surface = filter.shows(Partition::Surface).then(|| self.surface.values());
        let airborne = filter.shows(Partition::Airborne).then(|| self.airborne.values());
        surface.into_iter().flatten().chain(airborne.into_iter().flatten())
    }

    /// Iterate every registered entity, surface first.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.surface.values().chain(self.airborne.values())
    }

    /// Entities in one partition, in insertion order.
    pub fn partition(&self, partition: Partition) -> &IndexMap<EntityId, Entity> {
        match partition {
            Partition::Surface => &self.surface,
            Partition::Airborne => &self.airborne,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut IndexMap<EntityId, Entity> {
        match partition {
            Partition::Surface => &mut self.surface,
            Partition::Airborne => &mut self.airborne,
        }
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.surface.len() + self.airborne.len()
    }

    /// No entities registered?
    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.airborne.is_empty()
    }

    /// Tick every entity and drop those that report not-alive.
    ///
    /// Returns the removed entities in iteration order. A partition is only
    /// rebuilt when something in it died.
    pub fn sweep<F>(&mut self, mut tick: F) -> Vec<Entity>
    where
        F: FnMut(&mut Entity) -> bool,
    {
        let mut removed = Vec::new();
        for partition in [Partition::Surface, Partition::Airborne] {
            let map = self.partition_mut(partition);
            let dead: Vec<usize> = map
                .values_mut()
                .enumerate()
                .filter_map(|(index, entity)| (!tick(entity)).then_some(index))
                .collect();
            if dead.is_empty() {
                continue;
            }

            let mut dead = dead.into_iter().peekable();
            let mut kept = IndexMap::with_capacity(map.len() - dead.len());
            for (index, (id, entity)) in map.drain(..).enumerate() {
                if dead.next_if_eq(&index).is_some() {
                    debug!(id = %id, ?partition, "sweeping dead entity");
                    removed.push(entity);
                } else {
                    kept.insert(id, entity);
                }
            }
            *map = kept;
        }
        removed
    }

    /// Register an entity copied from a registry that already holds it.
    ///
    /// The caller guarantees `entity.id` is not yet registered here.
    pub(crate) fn insert_unique(&mut self, entity: Entity) {
        debug_assert!(!self.contains(entity.id), "duplicate id {} in copy", entity.id);
        self.partition_mut(Partition::of(&entity)).insert(entity.id, entity);
    }

    /// Register a deposit copied from a registry that already holds it.
    pub(crate) fn insert_deposit_unique(&mut self, deposit: ResourceDeposit) {
        debug_assert!(!self.deposits.contains_key(&deposit.id), "duplicate deposit {} in copy", deposit.id);
        self.deposits.insert(deposit.id, deposit);
    }

    /// Drop every entity and deposit.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.airborne.clear();
        self.deposits.clear();
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Register a deposit.
    pub fn insert_deposit(&mut self, deposit: ResourceDeposit) -> Result<(), StateError> {
        if self.deposits.contains_key(&deposit.id) {
            return Err(StateError::DuplicateDeposit(deposit.id));
        }
        self.deposits.insert(deposit.id, deposit);
        Ok(())
    }

    /// Look up a deposit.
    pub fn deposit(&self, id: DepositId) -> Result<&ResourceDeposit, StateError> {
        self.deposits.get(&id).ok_or(StateError::DepositNotFound(id))
    }

    /// Look up a deposit mutably.
    pub fn deposit_mut(&mut self, id: DepositId) -> Result<&mut ResourceDeposit, StateError> {
        self.deposits.get_mut(&id).ok_or(StateError::DepositNotFound(id))
    }

    /// All deposits in birth order.
    pub fn deposits(&self) -> impl Iterator<Item = &ResourceDeposit> {
        self.deposits.values()
    }

    /// Number of deposits.
    pub fn deposit_count(&self) -> usize {
        self.deposits.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::MapLocation;
    use crate::world::types::{RobotType, Team};

    fn entity(id: u32, robot_type: RobotType) -> Entity {
        Entity::new(robot_type, Team::A, EntityId(id))
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a Entity>) -> Vec<u32> {
        iter.map(|e| e.id.0).collect()
    }

    #[test]
    fn test_insert_routes_by_partition() {
        let mut registry = EntityRegistry::new();
        registry.insert(entity(1, RobotType::Soldier)).unwrap();
        registry.insert(entity(2, RobotType::Archon)).unwrap();

        assert_eq!(registry.partition_of(EntityId(1)), Some(Partition::Surface));
        assert_eq!(registry.partition_of(EntityId(2)), Some(Partition::Airborne));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected_across_partitions() {
        let mut registry = EntityRegistry::new();
        registry.insert(entity(5, RobotType::Soldier)).unwrap();

        // Same id, other partition
        let err = registry.insert(entity(5, RobotType::Scout)).unwrap_err();
        assert_eq!(err, StateError::DuplicateEntity(EntityId(5)));
        assert_eq!(registry.partition_of(EntityId(5)), Some(Partition::Surface));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_and_remove() {
        let mut registry = EntityRegistry::new();
        registry.insert(entity(3, RobotType::Wout)).unwrap();

        assert_eq!(registry.lookup(EntityId(3)).unwrap().robot_type, RobotType::Wout);
        registry.lookup_mut(EntityId(3)).unwrap().location = MapLocation::new(4, 4);
        assert_eq!(registry.lookup(EntityId(3)).unwrap().location, MapLocation::new(4, 4));

        let removed = registry.remove(EntityId(3)).unwrap();
        assert_eq!(removed.id, EntityId(3));
        assert_eq!(registry.lookup(EntityId(3)).unwrap_err(), StateError::EntityNotFound(EntityId(3)));
        assert_eq!(registry.remove(EntityId(3)).unwrap_err(), StateError::EntityNotFound(EntityId(3)));
    }

    #[test]
    fn test_iteration_order_and_filters() {
        let mut registry = EntityRegistry::new();
        registry.insert(entity(10, RobotType::Archon)).unwrap();
        registry.insert(entity(4, RobotType::Soldier)).unwrap();
        registry.insert(entity(7, RobotType::Scout)).unwrap();
        registry.insert(entity(1, RobotType::Tower)).unwrap();

        // Surface before airborne, insertion order within each
        assert_eq!(ids(registry.iter_live(|_: Partition| true)), vec![4, 1, 10, 7]);
        assert_eq!(ids(registry.iter_live(|p: Partition| p == Partition::Surface)), vec![4, 1]);
        assert_eq!(ids(registry.iter_live(|p: Partition| p == Partition::Airborne)), vec![10, 7]);
        assert!(registry.iter_live(|_: Partition| false).next().is_none());

        // Restartable
        let filter = |_: Partition| true;
        assert_eq!(ids(registry.iter_live(filter)), ids(registry.iter_live(filter)));
    }

    #[test]
    fn test_removal_keeps_order() {
        let mut registry = EntityRegistry::new();
        for id in [1, 2, 3, 4] {
            registry.insert(entity(id, RobotType::Soldier)).unwrap();
        }
        registry.remove(EntityId(2)).unwrap();
        assert_eq!(ids(registry.iter()), vec![1, 3, 4]);
    }

    #[test]
    fn test_sweep_removes_dead() {
        let mut registry = EntityRegistry::new();
        for id in [1, 2, 3] {
            registry.insert(entity(id, RobotType::Soldier)).unwrap();
        }
        registry.insert(entity(4, RobotType::Archon)).unwrap();
        registry.lookup_mut(EntityId(2)).unwrap().destroy();
        registry.lookup_mut(EntityId(4)).unwrap().destroy();

        let removed = registry.sweep(|e| e.update_round());
        assert_eq!(ids(removed.iter()), vec![2, 4]);
        assert_eq!(ids(registry.iter()), vec![1, 3]);
        assert!(!registry.contains(EntityId(2)));
    }

    #[test]
    fn test_sweep_without_deaths_ticks_in_place() {
        let mut registry = EntityRegistry::new();
        for id in [3, 1, 2] {
            registry.insert(entity(id, RobotType::Soldier)).unwrap();
        }
        registry.lookup_mut(EntityId(1)).unwrap().set_broadcast();

        let mut ticked = Vec::new();
        let removed = registry.sweep(|e| {
            ticked.push(e.id.0);
            e.update_round()
        });
        assert!(removed.is_empty());
        assert_eq!(ticked, vec![3, 1, 2]);
        assert_eq!(ids(registry.iter()), vec![3, 1, 2]);
        assert_eq!(registry.lookup(EntityId(1)).unwrap().broadcast_rings, 0b10);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "duplicate id")]
    fn test_insert_unique_catches_duplicate() {
        let mut registry = EntityRegistry::new();
        registry.insert_unique(entity(1, RobotType::Soldier));
        registry.insert_unique(entity(1, RobotType::Scout));
    }

    #[test]
    fn test_deposits() {
        let mut registry = EntityRegistry::new();
        let deposit = ResourceDeposit::new(DepositId(1), MapLocation::new(3, 3), 100);
        registry.insert_deposit(deposit).unwrap();

        assert_eq!(
            registry.insert_deposit(deposit).unwrap_err(),
            StateError::DuplicateDeposit(DepositId(1))
        );

        registry.deposit_mut(DepositId(1)).unwrap().rounds_remaining = 40;
        assert_eq!(registry.deposit(DepositId(1)).unwrap().rounds_remaining, 40);
        assert_eq!(
            registry.deposit(DepositId(2)).unwrap_err(),
            StateError::DepositNotFound(DepositId(2))
        );
    }
}
