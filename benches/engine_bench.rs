//! Criterion benchmarks for the population engine.
//!
//! Uses the Sphere function with a random-walk strategy so the numbers
//! reflect engine overhead (evaluation, repair, bookkeeping) rather than
//! any particular search operator.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_popcore::engine::{
    BoundaryRepair, Bounds, Engine, EngineConfig, EngineError, FitnessFunction, SearchStrategy,
    Stationary, Unit,
};

fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

// ===========================================================================
// Random walk: perturb, repair, re-evaluate
// ===========================================================================

struct RandomWalk {
    repair: BoundaryRepair,
}

impl SearchStrategy for RandomWalk {
    fn step<F: FitnessFunction>(
        &mut self,
        engine: &mut Engine<F>,
        _generation: usize,
    ) -> Result<(), EngineError> {
        for i in 0..engine.population().len() {
            let mut moved = engine.population()[i].position().to_vec();
            for x in moved.iter_mut() {
                *x += engine.rng_mut().random_range(-0.5..0.5);
            }
            let moved = engine.repair(self.repair, &moved, None)?;
            let fitness = engine.evaluate(&moved)?;
            let unit = &mut engine.population_mut()[i];
            unit.set_position(moved)?;
            unit.set_fitness(fitness);
        }
        Ok(())
    }
}

fn config(dim: usize, pop: usize, gen: usize) -> EngineConfig {
    let bounds = Bounds::uniform(dim, -5.0, 5.0).expect("valid bounds");
    EngineConfig::new(dim, bounds)
        .with_population_size(pop)
        .with_max_generations(gen)
        .minimize()
        .with_quiet(true)
        .with_seed(42)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_random_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_walk_sphere");
    group.sample_size(10);

    for (dim, pop, gen) in [(10usize, 50usize, 50usize), (50, 100, 30), (100, 100, 20)] {
        for repair in [BoundaryRepair::Clip, BoundaryRepair::Random] {
            group.bench_with_input(
                BenchmarkId::new(format!("{repair:?}"), format!("d{dim}_p{pop}_g{gen}")),
                &config(dim, pop, gen),
                |b, c| {
                    b.iter(|| {
                        let mut engine: Engine<_> =
                            Engine::new(black_box(c.clone()), sphere).expect("valid config");
                        engine
                            .run(&mut RandomWalk { repair }, None)
                            .expect("run succeeds");
                        black_box(engine.best_fitness())
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_bookkeeping(c: &mut Criterion) {
    let mut group = c.benchmark_group("stationary_bookkeeping");
    group.sample_size(10);

    for &pop in &[100usize, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(pop), &config(10, pop, 100), |b, c| {
            b.iter(|| {
                let mut engine: Engine<_, Unit> =
                    Engine::new(black_box(c.clone()), sphere).expect("valid config");
                engine.run(&mut Stationary, None).expect("run succeeds");
                black_box(engine.fitness_history().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_random_walk, bench_bookkeeping);
criterion_main!(benches);
