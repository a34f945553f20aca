//! 遗传算法
//!
//! 种群中的每个个体都是极大独立集，适应度为其大小。每一代先保留最好的若干个体，
//! 再用二元锦标赛选出亲本，经杂交与变异产生子代，直到种群补满。

use super::{AnyTime, Budget, Metaheuristic, Outcome};
use crate::construct::{greedy_alpha, greedy_with_neighbor_fill, random_feasible};
use crate::engine::Membership;
use crate::graph::Graph;
use crate::interfaces::{Interface, Message};
use crate::operators::{default::DefaultOperators, Crossover, Mutate};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::cmp::Reverse;
use tracing::{debug, info};
use web_time::Instant;

/// 初始种群的构造方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Initialization {
    /// 带邻居补位的确定性贪心解，其余为 RCL-α 随机贪心
    Greedy,
    /// 全部为随机可行解
    Random,
    /// 确定性贪心解，其余随机选择上面两种方式
    #[default]
    Mix,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genetic {
    pub population_size: Option<usize>,
    pub crossover_rate: Option<f64>,
    pub mutation_rate: Option<f64>,
    pub elitism: Option<usize>,
    /// 杂交时选择并集修复的概率
    pub union_bias: Option<f64>,
    pub removal_probability: Option<f64>,
    pub init: Option<Initialization>,
    /// 连续这么多代没有改进就重新生成非精英个体
    pub stall_generations: Option<u64>,
}

impl Genetic {
    pub fn operators(&self) -> DefaultOperators {
        let default = DefaultOperators::default();
        DefaultOperators {
            union_bias: self.union_bias.unwrap_or(default.union_bias),
            removal_probability: self
                .removal_probability
                .unwrap_or(default.removal_probability),
            mutation_rate: self.mutation_rate.unwrap_or(default.mutation_rate),
        }
    }

    /// 用给定的算子演化种群
    pub fn evolve<F, R>(
        &self,
        operators: &F,
        graph: &Graph,
        budget: &Budget,
        rng: &mut R,
        interface: &dyn Interface,
    ) -> Outcome
    where
        F: Crossover + Mutate,
        R: Rng + ?Sized,
    {
        let mut anytime = AnyTime::new(interface, Instant::now());
        let population_size = self.population_size.unwrap_or(80).max(1);
        let crossover_rate = self.crossover_rate.unwrap_or(0.9);
        let mutation_rate = self.mutation_rate.unwrap_or(0.03);
        let elitism = self
            .elitism
            .unwrap_or(2)
            .min(population_size.saturating_sub(1));
        let init = self.init.unwrap_or_default();
        let stall_generations = self.stall_generations.unwrap_or(100).max(1);
        info!(
            "遗传算法开始：种群 {population_size}，杂交率 {crossover_rate}，变异率 {mutation_rate}，精英 {elitism}，初始化 {init:?}"
        );

        let mut population = initial_population(graph, population_size, init, rng);
        anytime.offer(&population[fittest(&population)]);
        if graph.n() == 0 {
            return Outcome {
                best: anytime.finish(),
                steps: 0,
            };
        }

        let mut steps: u64 = 0;
        let mut generation: u64 = 0;
        let mut stall: u64 = 0;
        'evolve: loop {
            let mut order: Vec<usize> = (0..population.len()).collect();
            order.sort_by_key(|&i| Reverse(population[i].size()));
            let mut next: Vec<Membership> = order[..elitism]
                .iter()
                .map(|&i| population[i].clone())
                .collect();
            let mut improved = false;
            while next.len() < population_size {
                if budget.exhausted(anytime.elapsed(), steps) {
                    break 'evolve;
                }
                let a = &population[tournament(&population, rng)];
                let b = &population[tournament(&population, rng)];
                let mut child = if rng.random::<f64>() < crossover_rate {
                    operators.crossover(a, b, rng)
                } else if a.size() >= b.size() {
                    a.clone()
                } else {
                    b.clone()
                };
                if rng.random::<f64>() < mutation_rate {
                    operators.mutate(&mut child, rng);
                }
                steps += 1;
                improved |= anytime.offer(&child);
                next.push(child);
            }
            population = next;
            generation += 1;

            stall = if improved { 0 } else { stall + 1 };
            let restarted = stall >= stall_generations;
            if restarted {
                debug!("第 {generation} 代：连续 {stall} 代没有改进，重新生成非精英个体");
                for individual in population.iter_mut().skip(elitism) {
                    *individual = construct(graph, init, rng);
                }
                anytime.offer(&population[fittest(&population)]);
                stall = 0;
            }
            let mean_size =
                population.iter().map(|p| p.size()).sum::<usize>() as f64 / population.len() as f64;
            interface.send(Message::Generation {
                generation,
                best_size: anytime.best_size(),
                mean_size,
                restarted,
            });
        }

        info!("遗传算法结束：共 {generation} 代，{steps} 个子代");
        Outcome {
            best: anytime.finish(),
            steps,
        }
    }
}

impl Metaheuristic for Genetic {
    fn solve<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        budget: &Budget,
        rng: &mut R,
        interface: &dyn Interface,
    ) -> Outcome {
        self.evolve(&self.operators(), graph, budget, rng, interface)
    }
}

fn construct<'g, R: Rng + ?Sized>(
    graph: &'g Graph,
    init: Initialization,
    rng: &mut R,
) -> Membership<'g> {
    let greedy = match init {
        Initialization::Greedy => true,
        Initialization::Random => false,
        Initialization::Mix => rng.random::<bool>(),
    };
    if greedy {
        let alpha = 0.1 + 0.2 * rng.random::<f64>();
        greedy_alpha(graph, alpha, rng)
    } else {
        random_feasible(graph, rng)
    }
}

fn initial_population<'g, R: Rng + ?Sized>(
    graph: &'g Graph,
    size: usize,
    init: Initialization,
    rng: &mut R,
) -> Vec<Membership<'g>> {
    let mut population = Vec::with_capacity(size);
    if init != Initialization::Random {
        population.push(greedy_with_neighbor_fill(graph));
    }
    while population.len() < size {
        population.push(construct(graph, init, rng));
    }
    population
}

/// 最大个体中编号最小者
fn fittest(population: &[Membership]) -> usize {
    let mut best = 0;
    for (i, individual) in population.iter().enumerate() {
        if individual.size() > population[best].size() {
            best = i;
        }
    }
    best
}

/// 二元锦标赛，大小相同时取第一个
fn tournament<R: Rng + ?Sized>(population: &[Membership], rng: &mut R) -> usize {
    let a = rng.random_range(0..population.len());
    let b = rng.random_range(0..population.len());
    if population[a].size() >= population[b].size() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::Recorder;
    use crate::validate::check;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use web_time::Duration;

    fn steps_budget(steps: u64) -> Budget {
        Budget::new(Duration::from_secs(3600)).with_max_steps(steps)
    }

    fn small() -> Genetic {
        Genetic {
            population_size: Some(16),
            ..Default::default()
        }
    }

    #[test]
    fn initial_population_respects_mode() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let g = Graph::random(40, 0.1, &mut rng);
        for init in [Initialization::Greedy, Initialization::Random, Initialization::Mix] {
            let population = initial_population(&g, 10, init, &mut rng);
            assert_eq!(population.len(), 10);
            for p in &population {
                let members: Vec<usize> = p.members().collect();
                assert!(check(&g, &members).is_ok());
            }
        }
    }

    #[test]
    fn tournament_prefers_larger() {
        let g = Graph::from_edges(3, &[(0, 1)]);
        let population = vec![
            Membership::from_members(&g, [0], crate::engine::AddMode::Safe),
            Membership::from_members(&g, [0, 2], crate::engine::AddMode::Safe),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            let i = tournament(&population, &mut rng);
            let j = tournament(&population, &mut rng);
            assert!(population[i].size() >= 1 && population[j].size() >= 1);
        }
        assert_eq!(fittest(&population), 1);
    }

    #[test]
    fn finds_optimum_on_small_graphs() {
        let complete = Graph::from_edges(
            5,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)],
        );
        let triangles = Graph::from_edges(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = small().solve(&complete, &steps_budget(200), &mut rng, &Recorder::new());
        assert_eq!(outcome.best.size, 1);
        let outcome = small().solve(&triangles, &steps_budget(200), &mut rng, &Recorder::new());
        assert_eq!(outcome.best.size, 2);
        assert_eq!(outcome.steps, 200);
    }

    #[test]
    fn stalled_population_restarts() {
        let g = Graph::from_edges(4, &[(0, 1), (2, 3)]);
        let ga = Genetic {
            population_size: Some(4),
            stall_generations: Some(2),
            ..Default::default()
        };
        let recorder = Recorder::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        ga.solve(&g, &steps_budget(100), &mut rng, &recorder);
        assert!(recorder.messages().iter().any(|m| matches!(
            m,
            Message::Generation {
                restarted: true,
                ..
            }
        )));
    }

    #[test]
    fn same_seed_same_result() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let g = Graph::random(70, 0.08, &mut rng);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            small()
                .solve(&g, &steps_budget(500), &mut rng, &Recorder::new())
                .best
        };
        let (first, second) = (run(2), run(2));
        assert_eq!(first.vertices, second.vertices);
        assert!(check(&g, &first.vertices).is_ok());
    }
}
