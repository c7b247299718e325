//! Match Viewer
//!
//! Replays a match log on an ingestion thread while a render thread takes
//! snapshots of the shared world and reports what it would draw.
//!
//! Usage: `match-viewer [match.json]`. Without an argument a built-in
//! skirmish is replayed.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use match_viewer::{
    Direction, EntityId, MapLocation, MatchLog, Replayer, RobotType, RoundRecord, Signal, Team,
    ViewerConfig, VERSION,
};
use match_viewer::world::{ComponentType, DepositId, RoundStats, TargetHeight};

/// Pause between ingested rounds, so the render thread sees the match unfold.
const ROUND_PACING_MS: u64 = 2;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Match Viewer v{}", VERSION);

    let config = ViewerConfig::from_env();
    info!(
        tournament_mode = config.tournament_mode,
        show_surface = config.visibility.show_surface,
        show_airborne = config.visibility.show_airborne,
        snapshot_interval_ms = config.snapshot_interval_ms,
        checkpoint_interval = config.checkpoint_interval,
        "configuration loaded"
    );

    let log = match env::args().nth(1) {
        Some(path) => MatchLog::load(&path).with_context(|| format!("loading match log {}", path))?,
        None => {
            info!("no match log given, replaying built-in skirmish");
            skirmish().context("building skirmish")?
        }
    };
    info!(
        width = log.map.width(),
        height = log.map.height(),
        rounds = log.rounds.len(),
        signals = log.signal_count(),
        "match loaded"
    );

    run(&log, &config)
}

/// Ingest on one thread, render on another.
fn run(log: &MatchLog, config: &ViewerConfig) -> Result<()> {
    let mut replayer = Replayer::for_log(log, config);
    let world = replayer.world().clone();
    let done = Arc::new(AtomicBool::new(false));

    let render = {
        let world = world.clone();
        let done = Arc::clone(&done);
        let visibility = config.visibility;
        let interval = Duration::from_millis(config.snapshot_interval_ms);
        thread::spawn(move || {
            let mut frame = world.snapshot();
            let mut last_reported = frame.current_round();
            let mut frames = 0u64;
            loop {
                // Read the flag first so the final copy sees the last round
                let finished = done.load(Ordering::Acquire);
                world.copy_into(&mut frame);
                frames += 1;

                if frame.current_round() != last_reported {
                    last_reported = frame.current_round();
                    let visible = frame.iter_live(visibility).filter(|e| !e.in_transport).count();
                    for team in Team::COMPETITORS {
                        info!(
                            round = last_reported,
                            ?team,
                            visible,
                            health = frame.team_health(team),
                            archons = frame.archons(team).len(),
                            has_core = frame.power_core(team).is_some(),
                            chassis = ?frame.chassis_counts(team),
                            "frame"
                        );
                    }
                }

                if finished {
                    break;
                }
                thread::sleep(interval);
            }
            frames
        })
    };

    let mut outcome = Ok(());
    for record in &log.rounds {
        if let Err(e) = replayer.play_round(record) {
            outcome = Err(e);
            break;
        }
        thread::sleep(Duration::from_millis(ROUND_PACING_MS));
    }
    done.store(true, Ordering::Release);

    let frames = render.join().map_err(|_| anyhow!("render thread panicked"))?;
    outcome.context("replaying match")?;

    let final_hash = world.read(|state| state.compute_hash());
    for checkpoint in replayer.checkpoints() {
        info!(round = checkpoint.round, hash = %hex::encode(checkpoint.hash), "checkpoint");
    }
    info!(frames, hash = %hex::encode(final_hash), "match replayed");

    // Replaying the same log again must land on the same state
    let (replayed, _) = match_viewer::replay::replay_match(log, config).context("verification replay")?;
    if replayed.compute_hash() == final_hash {
        info!("REPLAY VERIFIED: hashes match");
    } else {
        warn!("REPLAY MISMATCH: hashes differ");
    }
    Ok(())
}

/// A short scripted match exercising every signal kind.
fn skirmish() -> Result<MatchLog, match_viewer::ReplayError> {
    let mut log = MatchLog::on_open_map(24, 24, MapLocation::new(0, 0))?;

    let spawn = |id: u32, robot_type: RobotType, team: Team, x: i32, y: i32, direction: Direction| Signal::Spawn {
        robot_id: EntityId(id),
        robot_type,
        team,
        loc: MapLocation::new(x, y),
        direction,
    };

    log.rounds.push(RoundRecord {
        signals: vec![
            spawn(1, RobotType::PowerNode, Team::A, 2, 2, Direction::North),
            spawn(2, RobotType::PowerNode, Team::B, 21, 21, Direction::North),
            spawn(3, RobotType::Archon, Team::A, 3, 3, Direction::SouthEast),
            spawn(4, RobotType::Archon, Team::B, 20, 20, Direction::NorthWest),
            spawn(5, RobotType::Tower, Team::Neutral, 12, 12, Direction::North),
            Signal::DepositBirth { deposit_id: DepositId(1), loc: MapLocation::new(11, 11), rounds_available: 40 },
            Signal::PowerOn { robot_ids: vec![EntityId(1), EntityId(2)] },
        ],
        stats: Some(RoundStats::default()),
    });

    // Each side builds an escort
    log.rounds.push(RoundRecord {
        signals: vec![
            spawn(6, RobotType::Soldier, Team::A, 4, 3, Direction::East),
            spawn(7, RobotType::Soldier, Team::B, 19, 20, Direction::West),
            spawn(8, RobotType::Wout, Team::A, 3, 4, Direction::South),
            Signal::Equip { robot_id: EntityId(6), component: ComponentType::Blaster },
            Signal::Equip { robot_id: EntityId(7), component: ComponentType::Railgun },
            Signal::Equip { robot_id: EntityId(3), component: ComponentType::Dish },
            Signal::Equip { robot_id: EntityId(4), component: ComponentType::Antenna },
        ],
        stats: None,
    });

    // March toward the middle
    for step in 0..6 {
        let resources = 10.0 + step as f64 * 2.5;
        log.rounds.push(RoundRecord {
            signals: vec![
                Signal::Movement { robot_id: EntityId(6), new_loc: MapLocation::new(5 + step, 4 + step), moving_forward: true },
                Signal::Movement { robot_id: EntityId(7), new_loc: MapLocation::new(18 - step, 19 - step), moving_forward: true },
                Signal::Broadcast { robot_id: EntityId(3) },
                Signal::BytecodesUsed { changes: vec![(EntityId(6), 3000 + step as u32), (EntityId(7), 2500)] },
                Signal::FluxChange { changes: vec![(EntityId(8), resources)] },
                Signal::IndicatorString { robot_id: EntityId(6), index: 0, text: format!("step {}", step) },
            ],
            stats: Some(RoundStats {
                team_resources: [resources, resources - 1.0],
                research_progress: [vec![step as f64 / 10.0], vec![step as f64 / 12.0]],
            }),
        });
    }

    // Skirmish at the deposit
    log.rounds.push(RoundRecord {
        signals: vec![
            Signal::SetDirection { robot_id: EntityId(6), direction: Direction::SouthEast },
            Signal::Attack { robot_id: EntityId(6), target_loc: MapLocation::new(13, 14), target_height: TargetHeight::OnGround },
            Signal::Attack { robot_id: EntityId(7), target_loc: MapLocation::new(10, 9), target_height: TargetHeight::OnGround },
            Signal::EnergonChange { changes: vec![(EntityId(6), 22.0), (EntityId(7), 4.0)] },
            Signal::DepositDepletion { deposit_id: DepositId(1), rounds_available: 25 },
            Signal::ControlBits { robot_id: EntityId(8), bits: 0b1011 },
        ],
        stats: None,
    });
    log.rounds.push(RoundRecord {
        signals: vec![
            Signal::Attack { robot_id: EntityId(6), target_loc: MapLocation::new(13, 14), target_height: TargetHeight::OnGround },
            Signal::EnergonChange { changes: vec![(EntityId(7), 0.0)] },
            Signal::Death { object_id: EntityId(7) },
            Signal::TeamCapture { robot_id: EntityId(5), new_team: Team::A },
        ],
        stats: None,
    });

    // Wout hops into the archon and is dropped off by the tower
    log.rounds.push(RoundRecord {
        signals: vec![
            Signal::Load { passenger_id: EntityId(8) },
            Signal::MovementOverride { robot_id: EntityId(3), new_loc: MapLocation::new(11, 12) },
            Signal::Movement { robot_id: EntityId(4), new_loc: MapLocation::new(14, 14), moving_forward: true },
        ],
        stats: None,
    });
    log.rounds.push(RoundRecord {
        signals: vec![
            Signal::Unload { passenger_id: EntityId(8), unload_loc: MapLocation::new(12, 11) },
            Signal::PowerOff { robot_id: EntityId(2) },
        ],
        stats: None,
    });

    Ok(log)
}
