use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use match_viewer::world::dispatch::apply;
use match_viewer::{DispatchConfig, Direction, EntityId, GameMap, MapLocation, RobotType, Signal, Team, WorldState};

fn populated(entities: u32) -> WorldState {
    let mut state = WorldState::create(GameMap::open(64, 64, MapLocation::default()).expect("map"));
    let config = DispatchConfig::default();
    for id in 0..entities {
        let robot_type = RobotType::ALL[id as usize % RobotType::ALL.len()];
        let team = if id % 2 == 0 { Team::A } else { Team::B };
        let signal = Signal::Spawn {
            robot_id: EntityId(id),
            robot_type,
            team,
            loc: MapLocation::new((id % 64) as i32, (id / 64) as i32),
            direction: Direction::North,
        };
        apply(&mut state, &signal, &config).expect("spawn");
    }
    state
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [64u32, 256, 1024] {
        let source = populated(size);

        group.bench_with_input(BenchmarkId::new("clone", size), &source, |b, source| {
            b.iter(|| black_box(source.snapshot()))
        });

        let mut dst = source.snapshot();
        group.bench_with_input(BenchmarkId::new("copy_into", size), &source, |b, source| {
            b.iter(|| {
                source.copy_into(&mut dst);
                black_box(dst.entity_count())
            })
        });
    }

    group.finish();
}

criterion_group!(snapshot_benches, bench_snapshot);
criterion_main!(snapshot_benches);
