//! World State
//!
//! The aggregate root: both entity partitions, the deposits, per-team
//! aggregates, the round counter, the map descriptor and the latest round
//! statistics.
//!
//! Mutation goes through `dispatch::apply` and `round::advance_round`;
//! everything here is the read interface the render layer uses.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::hash::{compute_state_hash, StateHash};
use crate::error::StateError;
use crate::world::aggregate::{TeamAggregate, TeamAggregates};
use crate::world::deposit::{DepositId, ResourceDeposit};
use crate::world::entity::{Entity, EntityFactory, EntityId};
use crate::world::map::GameMap;
use crate::world::registry::{EntityRegistry, VisibilityFilter};
use crate::world::stats::RoundStats;
use crate::world::types::{ComponentClass, ComponentType, RobotType, Team};

/// Round counter value before the first round is advanced.
pub const INITIAL_ROUND: i32 = -1;

/// Reconstructed world at one point in the signal stream.
pub struct WorldState {
    pub(crate) registry: EntityRegistry,
    pub(crate) aggregates: TeamAggregates,
    pub(crate) round: i32,
    pub(crate) map: Arc<GameMap>,
    pub(crate) stats: Option<Arc<RoundStats>>,
    pub(crate) factory: Arc<dyn EntityFactory>,
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("round", &self.round)
            .field("entities", &self.registry.len())
            .field("deposits", &self.registry.deposit_count())
            .field("aggregates", &self.aggregates)
            .finish_non_exhaustive()
    }
}

impl WorldState {
    // =========================================================================
    // Entities
    // =========================================================================

    /// Entity by id. Fails with `EntityNotFound` if not registered.
    pub fn lookup(&self, id: EntityId) -> Result<&Entity, StateError> {
        self.registry.lookup(id)
    }

    /// Entity by id, `None` if not registered.
    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.registry.find(id)
    }

    /// Registered entities in draw order, restricted by `filter`.
    pub fn iter_live<V>(&self, filter: V) -> impl Iterator<Item = &Entity> + '_
    where
        V: VisibilityFilter,
    {
        self.registry.iter_live(filter)
    }

    /// Underlying registry.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Deposit by id.
    pub fn deposit(&self, id: DepositId) -> Result<&ResourceDeposit, StateError> {
        self.registry.deposit(id)
    }

    /// All deposits in birth order.
    pub fn deposits(&self) -> impl Iterator<Item = &ResourceDeposit> {
        self.registry.deposits()
    }

    // =========================================================================
    // Per-team queries
    // =========================================================================

    /// Raw aggregate for `team`, `None` for neutral.
    pub fn aggregate(&self, team: Team) -> Option<&TeamAggregate> {
        self.aggregates.get(team)
    }

    /// Archons of `team` in spawn order. Ids that no longer resolve are skipped.
    pub fn archons(&self, team: Team) -> Vec<&Entity> {
        self.aggregates
            .get(team)
            .map(|agg| agg.archon_ids().iter().filter_map(|id| self.registry.find(*id)).collect())
            .unwrap_or_default()
    }

    /// Power core of `team`, if one is registered.
    pub fn power_core(&self, team: Team) -> Option<&Entity> {
        self.aggregates
            .get(team)
            .and_then(TeamAggregate::power_core_id)
            .and_then(|id| self.registry.find(id))
    }

    /// Live chassis counts for `team`; zero entries hidden.
    pub fn chassis_counts(&self, team: Team) -> BTreeMap<RobotType, i32> {
        self.aggregates.get(team).map(TeamAggregate::chassis_counts).unwrap_or_default()
    }

    /// Installed component counts for `team`, optionally by class; zero entries hidden.
    pub fn component_counts(
        &self,
        team: Team,
        class: Option<ComponentClass>,
    ) -> BTreeMap<ComponentType, i32> {
        self.aggregates
            .get(team)
            .map(|agg| agg.component_counts(class))
            .unwrap_or_default()
    }

    /// Cumulative health of `team`.
    pub fn team_health(&self, team: Team) -> f64 {
        self.aggregates.get(team).map_or(0.0, TeamAggregate::total_health)
    }

    /// Banked resources of `team` from the latest round statistics.
    pub fn team_resources(&self, team: Team) -> f64 {
        self.stats.as_ref().map_or(0.0, |stats| stats.team_resources(team))
    }

    /// Research progress of item `index` for `team` from the latest round statistics.
    pub fn research_progress(&self, team: Team, index: usize) -> Option<f64> {
        self.stats.as_ref().and_then(|stats| stats.research_progress(team, index))
    }

    // =========================================================================
    // Round and match
    // =========================================================================

    /// Latest round statistics.
    pub fn round_stats(&self) -> Option<&Arc<RoundStats>> {
        self.stats.as_ref()
    }

    /// Replace the round statistics wholesale.
    pub fn set_round_stats(&mut self, stats: Arc<RoundStats>) {
        self.stats = Some(stats);
    }

    /// Current round number; `INITIAL_ROUND` until the first advance.
    #[inline]
    pub fn current_round(&self) -> i32 {
        self.round
    }

    /// Map descriptor.
    pub fn map(&self) -> &Arc<GameMap> {
        &self.map
    }

    /// Do the aggregates match a from-scratch recount over alive entities?
    pub fn aggregates_consistent(&self) -> bool {
        self.aggregates.iter().all(|(team, agg)| {
            TeamAggregate::recount(team, self.registry.iter()).counters_match(agg)
        })
    }

    /// SHA-256 digest of the round, entities, deposits and aggregates.
    ///
    /// Covers every core entity field, one-round markers included. Round
    /// statistics are excluded.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.round, |hasher| {
            hasher.update_u32(self.registry.len() as u32);
            for entity in self.registry.iter() {
                entity.hash_into(hasher);
            }
            hasher.update_u32(self.registry.deposit_count() as u32);
            for deposit in self.registry.deposits() {
                deposit.hash_into(hasher);
            }
            for (_, agg) in self.aggregates.iter() {
                agg.hash_into(hasher);
            }
        })
    }
}
