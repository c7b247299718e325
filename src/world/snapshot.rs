//! Snapshot Manager
//!
//! Construction and deep copies of [`WorldState`], plus [`SharedWorld`], the
//! single-lock wrapper that lets an ingestion thread and a render thread
//! work on the same state.
//!
//! Copies go through the state's [`EntityFactory`] so render-side
//! bookkeeping can follow every record. Archon and power-core references
//! are ids, so a copy never points back into its source; they are
//! re-resolved against the copied entities and any that do not resolve are
//! dropped. Round statistics are shared by `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use crate::config::DispatchConfig;
use crate::error::ContractViolation;
use crate::world::aggregate::TeamAggregates;
use crate::world::dispatch;
use crate::world::entity::{EntityFactory, StandardFactory};
use crate::world::map::GameMap;
use crate::world::registry::EntityRegistry;
use crate::world::round::{self, RoundResult};
use crate::world::signal::Signal;
use crate::world::state::{WorldState, INITIAL_ROUND};
use crate::world::stats::RoundStats;

// =============================================================================
// CONSTRUCTION AND COPIES
// =============================================================================

impl WorldState {
    /// Empty state bound to `map`, building entities with [`StandardFactory`].
    pub fn create(map: GameMap) -> Self {
        Self::create_with_factory(map, Arc::new(StandardFactory))
    }

    /// Empty state bound to `map`, building entities with `factory`.
    pub fn create_with_factory(map: GameMap, factory: Arc<dyn EntityFactory>) -> Self {
        Self::with_shared_map(Arc::new(map), factory)
    }

    /// Empty state bound to an already shared map.
    pub fn with_shared_map(map: Arc<GameMap>, factory: Arc<dyn EntityFactory>) -> Self {
        Self {
            registry: EntityRegistry::new(),
            aggregates: TeamAggregates::default(),
            round: INITIAL_ROUND,
            map,
            stats: None,
            factory,
        }
    }

    /// Independent deep copy of this state.
    pub fn snapshot(&self) -> WorldState {
        let mut copy = WorldState::with_shared_map(Arc::clone(&self.map), Arc::clone(&self.factory));
        self.copy_into(&mut copy);
        copy
    }

    /// Overwrite `dst` with a deep copy of this state, reusing its storage.
    pub fn copy_into(&self, dst: &mut WorldState) {
        dst.registry.clear();
        for entity in self.registry.iter() {
            dst.registry.insert_unique(self.factory.copy(entity));
        }
        for deposit in self.registry.deposits() {
            dst.registry.insert_deposit_unique(*deposit);
        }

        dst.aggregates.clone_from(&self.aggregates);
        let registry = &dst.registry;
        for agg in dst.aggregates.iter_mut() {
            agg.retain_references(|id| registry.contains(id));
        }

        dst.round = self.round;
        dst.map = Arc::clone(&self.map);
        dst.stats = self.stats.clone();
        dst.factory = Arc::clone(&self.factory);
    }
}

impl Clone for WorldState {
    fn clone(&self) -> Self {
        self.snapshot()
    }

    fn clone_from(&mut self, source: &Self) {
        source.copy_into(self);
    }
}

// =============================================================================
// SHARED WORLD
// =============================================================================

struct Shared {
    state: Mutex<WorldState>,
    tournament_mode: AtomicBool,
}

/// A [`WorldState`] behind one lock, shared between ingestion and rendering.
///
/// Every operation holds the lock for its whole duration, so readers never
/// see a half-applied signal or a half-swept round. Cloning the handle
/// shares the same state.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<Shared>,
}

impl SharedWorld {
    /// Wrap `state`.
    pub fn new(state: WorldState) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(state),
                tournament_mode: AtomicBool::new(false),
            }),
        }
    }

    /// Toggle restricted display mode. Takes effect from the next signal.
    pub fn set_tournament_mode(&self, enabled: bool) {
        self.inner.tournament_mode.store(enabled, Ordering::Relaxed);
    }

    /// Is restricted display mode on?
    pub fn tournament_mode(&self) -> bool {
        self.inner.tournament_mode.load(Ordering::Relaxed)
    }

    /// Apply one signal under the lock.
    pub fn apply(&self, signal: &Signal) -> Result<(), ContractViolation> {
        let config = DispatchConfig { tournament_mode: self.tournament_mode() };
        let mut state = self.inner.state.lock();
        dispatch::apply(&mut state, signal, &config).map_err(|e| {
            error!(round = state.round, error = %e, "rejected signal");
            e
        })
    }

    /// Apply a round's signals in order under one lock acquisition.
    ///
    /// Stops at the first rejected signal; earlier ones stay applied.
    pub fn apply_all<'a, I>(&self, signals: I) -> Result<(), ContractViolation>
    where
        I: IntoIterator<Item = &'a Signal>,
    {
        let config = DispatchConfig { tournament_mode: self.tournament_mode() };
        let mut state = self.inner.state.lock();
        for signal in signals {
            if let Err(e) = dispatch::apply(&mut state, signal, &config) {
                error!(round = state.round, error = %e, "rejected signal");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Advance one round under the lock.
    pub fn advance_round(&self) -> RoundResult {
        round::advance_round(&mut self.inner.state.lock())
    }

    /// Replace the round statistics.
    pub fn set_round_stats(&self, stats: Arc<RoundStats>) {
        self.inner.state.lock().set_round_stats(stats);
    }

    /// Independent deep copy of the current state.
    pub fn snapshot(&self) -> WorldState {
        self.inner.state.lock().snapshot()
    }

    /// Overwrite `dst` with the current state.
    pub fn copy_into(&self, dst: &mut WorldState) {
        self.inner.state.lock().copy_into(dst);
    }

    /// Run `f` against the live state under the lock.
    ///
    /// Keep `f` short; ingestion is blocked while it runs.
    pub fn read<R>(&self, f: impl FnOnce(&WorldState) -> R) -> R {
        f(&self.inner.state.lock())
    }
}

impl std::fmt::Debug for SharedWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWorld")
            .field("tournament_mode", &self.tournament_mode())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
