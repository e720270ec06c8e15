use cellnet_core::grid::Grid;
use cellnet_data::{Position, RuleSet};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seeded_grid(side: i32) -> Grid {
    let mut grid = Grid::build(Position::new(0, 0), side, side, false).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    grid.randomize(&mut rng, 0.35);
    grid
}

fn bench_time_step(c: &mut Criterion) {
    let rules = RuleSet::default();
    let mut grid = seeded_grid(64);

    c.bench_function("time_step_64x64", |b| {
        b.iter(|| black_box(grid.time_step(&rules).len()))
    });
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_grid_64x64", |b| {
        b.iter(|| black_box(Grid::build(Position::new(0, 0), 64, 64, false).unwrap()))
    });
}

fn bench_relink(c: &mut Criterion) {
    let mut grid = seeded_grid(64);
    let rules = RuleSet::default();

    c.bench_function("relink_moore_64x64", |b| {
        b.iter(|| {
            grid.relink(&rules).unwrap();
            black_box(grid.len())
        })
    });
}

criterion_group!(benches, bench_time_step, bench_build, bench_relink);
criterion_main!(benches);
