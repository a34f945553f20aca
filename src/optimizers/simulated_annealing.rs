//! 退火算法
//!
//! 每一步随机取一个不在解中的顶点 v，设它有 k 个成员邻居，则把 v 换入（逐出这 k 个邻居）后解的大小变化为 1 − k。
//! 不变小的移动总是接受，变小的移动以 exp((1 − k) / T) 的概率接受。接受后在被扰动的邻域内做局部补全。
//!
//! 三个开关控制附加功能，核心的移动与接受规则在各种组合下完全相同：
//! - `diversify`：长时间没有改进时，按优先级逐出一部分成员再补全
//! - `adaptive_temperature`：按每个温度块的实际接受率在快、中、慢三档降温系数中选择
//! - `candidate_pool`：从打乱的非成员列表中抽样，代替均匀的拒绝抽样

use super::{AnyTime, Budget, Metaheuristic, Outcome, POLL_INTERVAL};
use crate::construct::greedy_by_degree;
use crate::engine::Membership;
use crate::graph::Graph;
use crate::interfaces::{Interface, Message};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{debug, info};
use web_time::Instant;

/// 温度下限，避免除以零
const MIN_TEMPERATURE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
/// 退火算法的参数，包括初温、降温系数、每个温度下的迭代次数
pub struct Schedule {
    pub t0: f64,
    pub alpha: f64,
    /// 缺省时取 max(1000, n)
    pub block: Option<usize>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            t0: 1.0,
            alpha: 0.999,
            block: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub diversify: bool,
    pub adaptive_temperature: bool,
    pub candidate_pool: bool,
}

/// 自适应降温：接受率偏高时快降温，偏低时慢降温
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveCooling {
    pub target: f64,
    pub tolerance: f64,
    pub fast: f64,
    pub normal: f64,
    pub slow: f64,
}

impl Default for AdaptiveCooling {
    fn default() -> Self {
        Self {
            target: 0.4,
            tolerance: 0.05,
            fast: 0.99,
            normal: 0.999,
            slow: 0.9999,
        }
    }
}

impl AdaptiveCooling {
    pub fn multiplier(&self, accept_rate: f64) -> f64 {
        if accept_rate > self.target + self.tolerance {
            self.fast
        } else if accept_rate < self.target - self.tolerance {
            self.slow
        } else {
            self.normal
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Diversification {
    /// 距上一次改进或上一次停滞的预算比例超过这个值，记一次停滞
    pub window: f64,
    /// 连续停滞这么多次后触发，即至少停滞 `window · checks` 的预算
    pub checks: usize,
    /// 逐出成员的比例
    pub fraction: f64,
    /// 触发后优先级向度数混合的比例
    pub blend: f64,
}

impl Default for Diversification {
    fn default() -> Self {
        Self {
            window: 0.1,
            checks: 3,
            fraction: 0.2,
            blend: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// 从候选池而不是全体顶点中抽样的概率
    pub probability: f64,
    /// 候选池多于这么多顶点时，抽中的顶点会被移出；取到只剩这么多时重建
    pub min_size: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            probability: 0.9,
            min_size: 64,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatedAnnealing {
    pub parameters: Option<Schedule>,
    pub options: Option<SearchOptions>,
    pub adaptive: Option<AdaptiveCooling>,
    pub diversification: Option<Diversification>,
    pub pool: Option<PoolSettings>,
}

/// 打乱的非成员列表
struct CandidatePool {
    entries: Vec<usize>,
    min_size: usize,
    /// 上次重建时非成员就不多于 `min_size`，此时有放回抽样，直到下一个温度块重建
    small: bool,
}

impl CandidatePool {
    fn new<R: Rng + ?Sized>(engine: &Membership, min_size: usize, rng: &mut R) -> Self {
        let mut pool = Self {
            entries: vec![],
            min_size,
            small: false,
        };
        pool.rebuild(engine, rng);
        pool
    }

    fn rebuild<R: Rng + ?Sized>(&mut self, engine: &Membership, rng: &mut R) {
        self.entries.clear();
        self.entries
            .extend((0..engine.graph().n()).filter(|&v| !engine.is_member(v)));
        self.entries.shuffle(rng);
        self.small = self.entries.len() <= self.min_size;
    }

    /// 池足够大时取出末尾的顶点，取到只剩 `min_size` 个时重建；非成员本来就少时有放回地随机抽取
    fn sample<R: Rng + ?Sized>(&mut self, engine: &Membership, rng: &mut R) -> Option<usize> {
        if !self.small && self.entries.len() <= self.min_size {
            self.rebuild(engine, rng);
        }
        if self.entries.len() > self.min_size {
            self.entries.pop()
        } else if self.entries.is_empty() {
            None
        } else {
            Some(self.entries[rng.random_range(0..self.entries.len())])
        }
    }

    /// 放到随机位置，避免刚被逐出的顶点立刻又被抽中
    fn insert<R: Rng + ?Sized>(&mut self, v: usize, rng: &mut R) {
        self.entries.push(v);
        let last = self.entries.len() - 1;
        let j = rng.random_range(0..=last);
        self.entries.swap(j, last);
    }
}

impl Metaheuristic for SimulatedAnnealing {
    fn solve<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        budget: &Budget,
        rng: &mut R,
        interface: &dyn Interface,
    ) -> Outcome {
        let mut anytime = AnyTime::new(interface, Instant::now());
        let mut engine = greedy_by_degree(graph);
        anytime.offer(&engine);
        let n = graph.n();
        if n == 0 {
            return Outcome {
                best: anytime.finish(),
                steps: 0,
            };
        }

        let schedule = self.parameters.unwrap_or_default();
        let options = self.options.unwrap_or_default();
        let adaptive = self.adaptive.unwrap_or_default();
        let diversification = self.diversification.unwrap_or_default();
        let pool_settings = self.pool.unwrap_or_default();
        let block = schedule.block.unwrap_or(n.max(1000)).max(1);
        info!(
            "退火开始：初温 {}，降温系数 {}，每温度 {} 步，选项 {:?}",
            schedule.t0, schedule.alpha, block, options
        );

        let mut temperature = schedule.t0.max(MIN_TEMPERATURE);
        let mut pool = options
            .candidate_pool
            .then(|| CandidatePool::new(&engine, pool_settings.min_size, rng));
        let mut priority: Vec<f64> = if options.diversify {
            (0..n).map(|v| graph.degree(v) as f64).collect()
        } else {
            vec![]
        };
        let mut evicted = Vec::new();
        let mut frontier = Vec::new();
        let mut steps: u64 = 0;
        let mut stagnation = Stagnation::default();

        'search: loop {
            let mut proposals: u64 = 0;
            let mut accepted: u64 = 0;
            for iteration in 0..block as u64 {
                if budget.max_steps.is_some_and(|max| steps >= max)
                    || (iteration % POLL_INTERVAL == 0 && anytime.elapsed() >= budget.runtime)
                {
                    break 'search;
                }
                steps += 1;

                let v = match pool.as_mut() {
                    Some(pool) if rng.random::<f64>() < pool_settings.probability => {
                        match pool.sample(&engine, rng) {
                            Some(v) => v,
                            None => continue,
                        }
                    }
                    _ => rng.random_range(0..n),
                };
                if engine.is_member(v) {
                    continue;
                }
                proposals += 1;

                let delta = 1.0 - engine.conflict(v) as f64;
                if !metropolis(delta, temperature, rng) {
                    continue;
                }
                accepted += 1;

                engine.swap_in(v, &mut evicted);
                frontier.clear();
                frontier.push(v);
                for &u in &evicted {
                    frontier.push(u);
                    frontier.extend_from_slice(graph.neighbors(u));
                }
                engine.complete_to_maximal_local(frontier.iter().copied());

                if options.diversify {
                    priority[v] += 1.0;
                    for &u in &evicted {
                        priority[u] -= 1.0;
                    }
                }
                if let Some(pool) = pool.as_mut() {
                    for &u in &evicted {
                        if !engine.is_member(u) {
                            pool.insert(u, rng);
                        }
                    }
                }
                if anytime.offer(&engine) {
                    stagnation.improved(budget.progress(anytime.elapsed(), steps));
                }
            }

            let accept_rate = if proposals > 0 {
                accepted as f64 / proposals as f64
            } else {
                0.0
            };
            temperature *= if options.adaptive_temperature {
                adaptive.multiplier(accept_rate)
            } else {
                schedule.alpha
            };
            temperature = temperature.max(MIN_TEMPERATURE);
            interface.send(Message::Progress {
                steps,
                temperature,
                accept_rate,
                current_size: engine.size(),
                best_size: anytime.best_size(),
            });

            if options.diversify {
                let progress = budget.progress(anytime.elapsed(), steps);
                if stagnation.check(progress, &diversification) {
                    let count = perturb(&mut engine, &mut priority, &diversification);
                    debug!("连续停滞，逐出 {count} 个成员后大小为 {}", engine.size());
                    interface.send(Message::Diversified {
                        evicted: count,
                        size: engine.size(),
                    });
                    stagnation.improved(progress);
                    // 补全之后可能比逐出之前更大
                    anytime.offer(&engine);
                }
            }
            if let Some(pool) = pool.as_mut() {
                pool.rebuild(&engine, rng);
            }
        }

        info!("退火结束：共 {steps} 步，最终温度 {temperature:.3e}");
        Outcome {
            best: anytime.finish(),
            steps,
        }
    }
}

/// Metropolis 准则：不变小的移动总是接受，否则以 exp(delta / T) 的概率接受
fn metropolis<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    delta >= 0.0 || rng.random::<f64>() < (delta / temperature).exp()
}

/// 停滞检测：距上一个检查点超过一个窗口记一次停滞，连续达到次数后触发
#[derive(Debug, Default)]
struct Stagnation {
    checkpoint: f64,
    count: usize,
}

impl Stagnation {
    fn improved(&mut self, progress: f64) {
        self.checkpoint = progress;
        self.count = 0;
    }

    fn check(&mut self, progress: f64, settings: &Diversification) -> bool {
        if progress - self.checkpoint <= settings.window {
            return false;
        }
        self.checkpoint = progress;
        self.count += 1;
        self.count >= settings.checks
    }
}

/// 逐出优先级最高的一部分成员，补全，再把优先级向度数混合
///
/// 优先级在顶点被接受时升高、被逐出时降低，初值为度数；返回逐出的顶点数
fn perturb(engine: &mut Membership, priority: &mut [f64], settings: &Diversification) -> usize {
    let graph = engine.graph();
    let mut members: Vec<usize> = engine.members().collect();
    let count = ((members.len() as f64 * settings.fraction).ceil() as usize).min(members.len());
    members.sort_by(|&a, &b| priority[b].total_cmp(&priority[a]).then(a.cmp(&b)));
    let mut removed = vec![false; graph.n()];
    for &u in &members[..count] {
        engine.remove(u);
        removed[u] = true;
    }
    // 先让被逐出顶点的邻居有机会进入，再全局补全
    let mut frontier = Vec::new();
    for &u in &members[..count] {
        frontier.extend(graph.neighbors(u).iter().copied().filter(|&w| !removed[w]));
    }
    engine.complete_to_maximal_local(frontier);
    engine.complete_to_maximal();
    for (v, p) in priority.iter_mut().enumerate() {
        *p = (1.0 - settings.blend) * *p + settings.blend * graph.degree(v) as f64;
    }
    count
}
