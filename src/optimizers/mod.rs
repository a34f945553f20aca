//! 求解方法接口，以及若干求解方法的实现
//!

use crate::config::SolverConfig;
use crate::engine::Membership;
use crate::graph::Graph;
use crate::interfaces::{Interface, Message};
use rand::Rng;
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

pub mod genetic;
pub mod simulated_annealing;

/// 每隔这么多次内层迭代检查一次是否超时
pub const POLL_INTERVAL: u64 = 1024;

/// 运行预算：墙钟时间，以及可选的步数上限
///
/// 固定随机种子并设置步数上限时，运行结果完全可复现
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    pub runtime: Duration,
    pub max_steps: Option<u64>,
}

impl Budget {
    pub fn new(runtime: Duration) -> Self {
        Self {
            runtime,
            max_steps: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn exhausted(&self, elapsed: Duration, steps: u64) -> bool {
        elapsed >= self.runtime || self.max_steps.is_some_and(|max| steps >= max)
    }

    /// 已消耗的预算比例，取时间比例与步数比例中的较大者
    pub fn progress(&self, elapsed: Duration, steps: u64) -> f64 {
        let time = if self.runtime.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / self.runtime.as_secs_f64()
        };
        let steps = match self.max_steps {
            Some(0) => 1.0,
            Some(max) => steps as f64 / max as f64,
            None => 0.0,
        };
        time.max(steps)
    }
}

/// 一个已确认的独立集，以及发现它的时刻
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// 按编号升序排列的成员（0 起始）
    pub vertices: Vec<usize>,
    pub size: usize,
    /// 自开始运行以来的秒数
    pub elapsed: f64,
}

pub struct Outcome {
    pub best: Solution,
    /// 退火中为提议次数，遗传算法中为产生的子代数
    pub steps: u64,
}

pub trait Metaheuristic {
    fn solve<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        budget: &Budget,
        rng: &mut R,
        interface: &dyn Interface,
    ) -> Outcome;
}

/// 随时输出：记录最优解，每次严格改进时向界面报告
pub struct AnyTime<'a> {
    interface: &'a dyn Interface,
    start: Instant,
    best: Option<Solution>,
}

impl<'a> AnyTime<'a> {
    pub fn new(interface: &'a dyn Interface, start: Instant) -> Self {
        Self {
            interface,
            start,
            best: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn best_size(&self) -> usize {
        self.best.as_ref().map_or(0, |b| b.size)
    }

    /// 若 `engine` 严格优于已知最优（或尚无最优），记录快照并报告，返回是否更新
    pub fn offer(&mut self, engine: &Membership) -> bool {
        if self.best.as_ref().is_some_and(|b| engine.size() <= b.size) {
            return false;
        }
        debug_assert_eq!(engine.conflicted_members(), 0, "最优解必须是独立集");
        let elapsed = self.elapsed().as_secs_f64();
        let solution = Solution {
            vertices: engine.members().collect(),
            size: engine.size(),
            elapsed,
        };
        self.interface.send(Message::Improvement {
            best_size: solution.size,
            elapsed,
        });
        self.best = Some(solution);
        true
    }

    /// 结束运行，重复报告一次最优结果
    pub fn finish(self) -> Solution {
        let best = self.best.unwrap_or(Solution {
            vertices: vec![],
            size: 0,
            elapsed: 0.0,
        });
        self.interface.send(Message::Final {
            best_size: best.size,
            elapsed: best.elapsed,
        });
        best
    }
}

impl SolverConfig {
    pub fn solve<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        budget: &Budget,
        rng: &mut R,
        interface: &dyn Interface,
    ) -> Outcome {
        match self {
            SolverConfig::SimulatedAnnealing(sa) => sa.solve(graph, budget, rng, interface),
            SolverConfig::Genetic(ga) => ga.solve(graph, budget, rng, interface),
        }
    }
}
