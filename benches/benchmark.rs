use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mis::construct::{greedy_by_degree, random_feasible};
use mis::engine::{AddMode, Membership};
use mis::optimizers::simulated_annealing::SimulatedAnnealing;
use mis::{Budget, Graph, Metaheuristic, Recorder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use web_time::Duration;

fn random_graph(n: usize, p: f64) -> Graph {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    Graph::random(n, p, &mut rng)
}

fn annealing_steps(c: &mut Criterion) {
    let graph = random_graph(2000, 0.005);
    let sa = SimulatedAnnealing::default();
    let budget = Budget::new(Duration::from_secs(3600)).with_max_steps(100_000);
    c.bench_function("退火十万步", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            black_box(sa.solve(&graph, &budget, &mut rng, &Recorder::new()).best.size)
        })
    });
}

fn local_completion(c: &mut Criterion) {
    let graph = random_graph(5000, 0.002);
    let start = greedy_by_degree(&graph);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    c.bench_function("换入并局部补全", |b| {
        b.iter_batched(
            || (start.clone(), rng.random_range(0..graph.n())),
            |(mut engine, v)| {
                if !engine.is_member(v) {
                    let mut evicted = vec![];
                    engine.swap_in(v, &mut evicted);
                    let frontier: Vec<usize> = evicted
                        .iter()
                        .flat_map(|&u| std::iter::once(u).chain(graph.neighbors(u).iter().copied()))
                        .collect();
                    engine.complete_to_maximal_local(frontier);
                }
                black_box(engine.size())
            },
            BatchSize::SmallInput,
        )
    });
}

fn union_repair(c: &mut Criterion) {
    let graph = random_graph(2000, 0.01);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let a = random_feasible(&graph, &mut rng);
    let b = random_feasible(&graph, &mut rng);
    c.bench_function("并集修复", |bench| {
        bench.iter(|| {
            let mut child = a.clone();
            for v in b.members() {
                if !child.is_member(v) {
                    child.add(v, AddMode::Forced);
                }
            }
            black_box(child.repair_and_complete())
        })
    });
    c.bench_function("从头全局补全", |bench| {
        bench.iter(|| {
            let mut engine = Membership::new(&graph);
            black_box(engine.complete_to_maximal())
        })
    });
}

criterion_group!(benches, annealing_steps, local_completion, union_repair);
criterion_main!(benches);
