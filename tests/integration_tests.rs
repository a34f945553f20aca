use mis::config::{Config, SolverConfig};
use mis::construct::greedy_by_degree;
use mis::io::{format_solution, parse_graph, parse_solution};
use mis::optimizers::genetic::Genetic;
use mis::optimizers::simulated_annealing::{SearchOptions, SimulatedAnnealing};
use mis::validate::check;
use mis::{Budget, Graph, Message, Metaheuristic, Recorder};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use web_time::Duration;

fn path() -> Graph {
    Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)])
}

fn complete(n: usize) -> Graph {
    let edges: Vec<_> = (0..n)
        .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
        .collect();
    Graph::from_edges(n, &edges)
}

fn two_triangles() -> Graph {
    Graph::from_edges(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)])
}

fn steps(max: u64) -> Budget {
    Budget::new(Duration::from_secs(3600)).with_max_steps(max)
}

fn solvers() -> Vec<SolverConfig> {
    let mut solvers = vec![];
    for mask in 0..8u8 {
        solvers.push(SolverConfig::SimulatedAnnealing(SimulatedAnnealing {
            options: Some(SearchOptions {
                diversify: mask & 1 != 0,
                adaptive_temperature: mask & 2 != 0,
                candidate_pool: mask & 4 != 0,
            }),
            ..Default::default()
        }));
    }
    solvers.push(SolverConfig::Genetic(Genetic {
        population_size: Some(20),
        ..Default::default()
    }));
    solvers
}

#[test]
fn path_greedy_takes_every_other_vertex() {
    let g = path();
    let engine = greedy_by_degree(&g);
    assert_eq!(engine.members().collect::<Vec<_>>(), vec![0, 2, 4]);
    assert!(check(&g, &[0, 2, 4]).is_ok());
}

#[test]
fn empty_graph_terminates_immediately() {
    let g = Graph::with_vertices(0);
    for solver in solvers() {
        let recorder = Recorder::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = solver.solve(&g, &steps(1_000), &mut rng, &recorder);
        assert_eq!(outcome.best.size, 0);
        assert_eq!(outcome.steps, 0);
        let sizes: Vec<usize> = recorder.anytime().iter().map(|e| e.0).collect();
        assert_eq!(sizes, vec![0, 0]);
    }
}

#[test]
fn complete_graph_never_exceeds_one() {
    let g = complete(5);
    for solver in solvers() {
        let recorder = Recorder::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = solver.solve(&g, &steps(2_000), &mut rng, &recorder);
        assert_eq!(outcome.best.size, 1);
        assert!(recorder.anytime().iter().all(|e| e.0 == 1));
    }
}

#[test]
fn two_triangles_reach_two() {
    let g = two_triangles();
    for solver in solvers() {
        let recorder = Recorder::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let outcome = solver.solve(&g, &steps(2_000), &mut rng, &recorder);
        assert_eq!(outcome.best.size, 2);
        assert!(check(&g, &outcome.best.vertices).is_ok());
        assert!(recorder.anytime().iter().all(|e| e.0 <= 2));
    }
}

#[test]
fn anytime_stream_is_monotone_and_ends_with_maximum() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let g = Graph::random(150, 0.05, &mut rng);
    for solver in solvers() {
        let recorder = Recorder::new();
        let outcome = solver.solve(&g, &steps(20_000), &mut rng, &recorder);
        let stream = recorder.anytime();
        assert!(stream.len() >= 2);
        for pair in stream[..stream.len() - 1].windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 <= pair[1].1);
        }
        let (last, final_event) = (stream[stream.len() - 2], stream[stream.len() - 1]);
        assert_eq!(last, final_event);
        assert_eq!(final_event.0, outcome.best.size);
        // 运行中观察到的任何解都不超过最终报告的最优值
        for message in recorder.messages() {
            match message {
                Message::Progress { current_size, .. } => assert!(current_size <= final_event.0),
                Message::Generation { best_size, .. } => assert!(best_size <= final_event.0),
                _ => {}
            }
        }
        assert!(check(&g, &outcome.best.vertices).is_ok());
    }
}

#[test]
fn fixed_seed_and_step_cap_reproduce() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let g = Graph::random(120, 0.06, &mut rng);
    for solver in solvers() {
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            solver.solve(&g, &steps(5_000), &mut rng, &Recorder::new())
        };
        let (a, b) = (run(), run());
        assert_eq!(a.best.vertices, b.best.vertices);
        assert_eq!(a.steps, b.steps);
    }
}

#[test]
fn annealing_beats_or_matches_greedy() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let g = Graph::random(200, 0.03, &mut rng);
    let greedy = greedy_by_degree(&g).size();
    let sa = SimulatedAnnealing::default();
    let outcome = sa.solve(&g, &steps(50_000), &mut rng, &Recorder::new());
    assert!(outcome.best.size >= greedy);
}

#[test]
fn loader_output_feeds_solver_and_validator() {
    let text = "c two triangles\np edge 6 6\ne 1 2\ne 2 3\ne 1 3\ne 4 5\ne 5 6\ne 4 6\n";
    let g = parse_graph(text.as_bytes()).unwrap();
    assert_eq!((g.n(), g.m()), (6, 6));
    let config = Config::from_yaml("solver:\n  algorithm: genetic\n  population_size: 8\n").unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let outcome = config
        .solver
        .solve(&g, &steps(300), &mut rng, &Recorder::new());
    let persisted = format_solution(&outcome.best.vertices);
    let restored = parse_solution(&persisted).unwrap();
    assert_eq!(restored, outcome.best.vertices);
    assert!(check(&g, &restored).is_ok());
}
