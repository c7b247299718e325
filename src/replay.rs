//! Match Log Replay
//!
//! Drives a [`SharedWorld`] from a recorded match log, one round at a time,
//! and records state-hash checkpoints so two replays of the same log can be
//! compared cheaply.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::ViewerConfig;
use crate::core::hash::StateHash;
use crate::core::location::MapLocation;
use crate::error::{ContractViolation, StateError};
use crate::world::map::GameMap;
use crate::world::round::RoundResult;
use crate::world::signal::Signal;
use crate::world::snapshot::SharedWorld;
use crate::world::state::WorldState;
use crate::world::stats::RoundStats;

/// Replay failures.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A signal did not apply against the reconstructed state.
    #[error("round {round}: {source}")]
    Contract {
        /// Round the signal belonged to
        round: i32,
        /// The rejected signal and its cause
        #[source]
        source: ContractViolation,
    },

    /// The log's map descriptor is invalid.
    #[error("invalid map in match log: {0}")]
    Descriptor(#[source] StateError),

    /// The log is not valid JSON for a match log.
    #[error("failed to decode match log: {0}")]
    Decode(#[from] serde_json::Error),

    /// The log could not be read.
    #[error("failed to read match log: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// MATCH LOG
// =============================================================================

/// Signals and statistics of one round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Signals in simulator order
    #[serde(default)]
    pub signals: Vec<Signal>,
    /// Statistics published at the end of the round
    #[serde(default)]
    pub stats: Option<RoundStats>,
}

/// A recorded match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchLog {
    /// Map the match was played on
    pub map: GameMap,
    /// Rounds in order
    pub rounds: Vec<RoundRecord>,
}

impl MatchLog {
    /// Empty log on an all-land map.
    pub fn on_open_map(width: u32, height: u32, origin: MapLocation) -> Result<Self, ReplayError> {
        let map = GameMap::open(width, height, origin).map_err(ReplayError::Descriptor)?;
        Ok(Self { map, rounds: Vec::new() })
    }

    /// Parse a log from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON log file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Total number of signals across all rounds.
    pub fn signal_count(&self) -> usize {
        self.rounds.iter().map(|r| r.signals.len()).sum()
    }
}

// =============================================================================
// REPLAYER
// =============================================================================

/// State hash taken after a round was advanced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCheckpoint {
    /// Round number after the advance
    pub round: i32,
    /// `WorldState::compute_hash` at that point
    pub hash: StateHash,
}

/// Feeds rounds of a match log into a shared world.
#[derive(Debug)]
pub struct Replayer {
    world: SharedWorld,
    checkpoint_interval: u32,
    checkpoints: Vec<RoundCheckpoint>,
}

impl Replayer {
    /// Replay into `world`, checkpointing every `checkpoint_interval` rounds (0 disables).
    pub fn new(world: SharedWorld, checkpoint_interval: u32) -> Self {
        Self { world, checkpoint_interval, checkpoints: Vec::new() }
    }

    /// Replayer over a fresh world for `log`, configured from `config`.
    pub fn for_log(log: &MatchLog, config: &ViewerConfig) -> Self {
        let world = SharedWorld::new(WorldState::create(log.map.clone()));
        world.set_tournament_mode(config.tournament_mode);
        Self::new(world, config.checkpoint_interval)
    }

    /// Handle to the world being driven.
    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// Checkpoints recorded so far.
    pub fn checkpoints(&self) -> &[RoundCheckpoint] {
        &self.checkpoints
    }

    /// Apply one round's signals, install its statistics, then advance.
    pub fn play_round(&mut self, record: &RoundRecord) -> Result<RoundResult, ReplayError> {
        let round = self.world.read(WorldState::current_round);
        self.world
            .apply_all(&record.signals)
            .map_err(|source| ReplayError::Contract { round, source })?;

        if let Some(stats) = &record.stats {
            self.world.set_round_stats(Arc::new(stats.clone()));
        }

        let result = self.world.advance_round();
        if self.is_checkpoint(result.round) {
            let hash = self.world.read(WorldState::compute_hash);
            info!(round = result.round, hash = %hex::encode(hash), "checkpoint");
            self.checkpoints.push(RoundCheckpoint { round: result.round, hash });
        }
        Ok(result)
    }

    fn is_checkpoint(&self, round: i32) -> bool {
        let interval = i64::from(self.checkpoint_interval);
        interval > 0 && (i64::from(round) + 1) % interval == 0
    }

    /// Play every round of `log`. Stops at the first contract violation.
    pub fn play(&mut self, log: &MatchLog) -> Result<StateHash, ReplayError> {
        info!(rounds = log.rounds.len(), signals = log.signal_count(), "replaying match");
        for record in &log.rounds {
            if let Err(e) = self.play_round(record) {
                error!(error = %e, "replay aborted");
                return Err(e);
            }
        }
        let hash = self.world.read(WorldState::compute_hash);
        info!(hash = %hex::encode(hash), "replay finished");
        Ok(hash)
    }
}

/// Replay `log` into a fresh world and return the final state with its checkpoints.
pub fn replay_match(
    log: &MatchLog,
    config: &ViewerConfig,
) -> Result<(WorldState, Vec<RoundCheckpoint>), ReplayError> {
    let mut replayer = Replayer::for_log(log, config);
    replayer.play(log)?;
    Ok((replayer.world.snapshot(), replayer.checkpoints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::Direction;
    use crate::world::entity::EntityId;
    use crate::world::types::{RobotType, Team};

    fn skirmish() -> MatchLog {
        let mut log = MatchLog::on_open_map(10, 10, MapLocation::default()).unwrap();
        log.rounds.push(RoundRecord {
            signals: vec![
                Signal::Spawn {
                    robot_id: EntityId(1),
                    robot_type: RobotType::Archon,
                    team: Team::A,
                    loc: MapLocation::new(1, 1),
                    direction: Direction::East,
                },
                Signal::Spawn {
                    robot_id: EntityId(2),
                    robot_type: RobotType::Soldier,
                    team: Team::B,
                    loc: MapLocation::new(8, 8),
                    direction: Direction::West,
                },
            ],
            stats: Some(RoundStats { team_resources: [10.0, 10.0], ..Default::default() }),
        });
        for x in 2..6 {
            log.rounds.push(RoundRecord {
                signals: vec![Signal::Movement {
                    robot_id: EntityId(1),
                    new_loc: MapLocation::new(x, 1),
                    moving_forward: true,
                }],
                stats: None,
            });
        }
        log.rounds.push(RoundRecord {
            signals: vec![Signal::Death { object_id: EntityId(2) }],
            stats: None,
        });
        log
    }

    fn config(interval: u32) -> ViewerConfig {
        ViewerConfig { checkpoint_interval: interval, ..Default::default() }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let log = skirmish();
        let (first, checkpoints_a) = replay_match(&log, &config(2)).unwrap();
        let (second, checkpoints_b) = replay_match(&log, &config(2)).unwrap();

        assert_eq!(checkpoints_a, checkpoints_b);
        assert_eq!(checkpoints_a.len(), 3);
        assert_eq!(first.compute_hash(), second.compute_hash());
        assert_eq!(first.current_round(), 5);
        assert!(first.find(EntityId(2)).is_none());
        assert_eq!(first.lookup(EntityId(1)).unwrap().location, MapLocation::new(5, 1));
        assert_eq!(first.team_resources(Team::A), 10.0);
    }

    #[test]
    fn test_wide_checkpoint_interval() {
        let log = skirmish();
        let (_, checkpoints) = replay_match(&log, &config(u32::MAX)).unwrap();
        assert!(checkpoints.is_empty());

        let (_, checkpoints) = replay_match(&log, &config(0)).unwrap();
        assert!(checkpoints.is_empty());

        let (_, checkpoints) = replay_match(&log, &config(6)).unwrap();
        assert_eq!(checkpoints.iter().map(|c| c.round).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_json_log() {
        let log = skirmish();
        let json = log.to_json().unwrap();
        let parsed = MatchLog::from_json(&json).unwrap();
        assert_eq!(parsed, log);
        assert_eq!(parsed.signal_count(), 7);
    }

    #[test]
    fn test_contract_violation_reports_round() {
        let mut log = skirmish();
        log.rounds.push(RoundRecord {
            signals: vec![Signal::Broadcast { robot_id: EntityId(2) }],
            stats: None,
        });

        match replay_match(&log, &config(0)) {
            Err(ReplayError::Contract { round, source }) => {
                assert_eq!(round, 5);
                assert!(source.cause().is_not_found());
            }
            other => panic!("expected contract violation, got {:?}", other.map(|(s, _)| s.current_round())),
        }
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(MatchLog::from_json("{"), Err(ReplayError::Decode(_))));
        assert!(matches!(
            MatchLog::on_open_map(0, 0, MapLocation::default()),
            Err(ReplayError::Descriptor(_))
        ));
        assert!(matches!(
            MatchLog::load("/nonexistent/match.json"),
            Err(ReplayError::Io(_))
        ));
    }
}
