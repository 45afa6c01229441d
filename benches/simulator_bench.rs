//! Simulator throughput benchmarks: trials per second at several fleet sizes.
//!
//! Run with: `cargo bench --bench simulator`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use primus::combat::{BaseStats, Boss, Fleet, Knobs, Lieutenant, Rng, Ship, ShipClass};
use primus::sim::trial::run_trial;

fn bench_ship(name: &str, position: u8) -> Ship {
    let base = BaseStats {
        attack: 50_000.0,
        special_attack: 40_000.0,
        special_damage: 250.0,
        crit_chance: 10.0,
        crit_damage: 180.0,
        penetration: 20.0,
        hit_rate: 140.0,
        dodge: 45.0,
        block: 30.0,
        lock_rate: 15.0,
        ..BaseStats::default()
    };
    Ship::new(name, ShipClass::Ranger, position, base, Lieutenant::Violette)
}

fn fleet_of(size: u8) -> Fleet {
    Fleet::new(
        (1..=size)
            .map(|slot| bench_ship(&format!("ship {slot}"), slot))
            .collect(),
    )
}

fn bench_boss() -> Boss {
    Boss::new(20.0, 40.0, 160.0, 30.0)
}

fn bench_trials(c: &mut Criterion) {
    let mut group = c.benchmark_group("trial");
    group.sample_size(100);

    for size in [1u8, 5, 9] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(format!("fleet_{size}"), &size, |b, &size| {
            let fleet = fleet_of(size);
            let boss = bench_boss();
            b.iter_batched(
                || (fleet.clone(), boss.clone(), Rng::new(7)),
                |(mut fleet, mut boss, mut rng)| {
                    black_box(run_trial(&mut fleet, &mut boss, Knobs::default(), &mut rng))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trials);
criterion_main!(benches);
