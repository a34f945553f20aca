//! 初始解的构造方法
//!
//! • `greedy_by_degree`：按度数升序贪心，确定性
//! • `greedy_with_neighbor_fill`：同上，并在处理每个顶点后立即加入它的低度数邻居
//! • `greedy_alpha`：RCL-α 随机贪心
//! • `random_feasible`：随机可行解再补全
//!
//! 所有方法返回的解都是独立且极大的。

use crate::engine::{AddMode, Membership};
use crate::graph::Graph;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// 按度数升序依次尝试加入顶点，度数相同时编号小者优先
pub fn greedy_by_degree(graph: &Graph) -> Membership<'_> {
    let mut engine = Membership::new(graph);
    for v in graph.ascending_degree_order() {
        if engine.is_free(v) {
            engine.add(v, AddMode::Safe);
        }
    }
    engine.complete_to_maximal();
    engine
}

/// 邻居补位时只考虑度数不超过这个值的顶点
const FILL_DEGREE: usize = 3;

/// 按度数升序贪心，每处理一个顶点（无论是否加入）后，立即加入它度数不超过 3 的可加入邻居
pub fn greedy_with_neighbor_fill(graph: &Graph) -> Membership<'_> {
    let mut engine = Membership::new(graph);
    for v in graph.ascending_degree_order() {
        if engine.is_free(v) {
            engine.add(v, AddMode::Safe);
        }
        for &u in graph.neighbors(v) {
            if graph.degree(u) <= FILL_DEGREE && engine.is_free(u) {
                engine.add(u, AddMode::Safe);
            }
        }
    }
    engine.complete_to_maximal();
    engine
}

/// RCL-α 随机贪心
///
/// 在剩余图中取剩余度数不超过 `dmin + α (dmax − dmin)` 的顶点组成候选表，随机选一个加入，
/// 再把它和它的邻居从剩余图中删去。`alpha` 取 0 时退化为最小度贪心，取 1 时为完全随机。
pub fn greedy_alpha<'g, R>(graph: &'g Graph, alpha: f64, rng: &mut R) -> Membership<'g>
where
    R: Rng + ?Sized,
{
    let alpha = alpha.clamp(0.0, 1.0);
    let n = graph.n();
    let mut engine = Membership::new(graph);
    let mut alive = vec![true; n];
    let mut degree: Vec<usize> = (0..n).map(|v| graph.degree(v)).collect();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut candidates = Vec::with_capacity(n);

    while !remaining.is_empty() {
        let dmin = remaining.iter().map(|&u| degree[u]).min().unwrap_or(0);
        let dmax = remaining.iter().map(|&u| degree[u]).max().unwrap_or(0);
        let threshold = dmin as f64 + alpha * (dmax - dmin) as f64;
        candidates.clear();
        candidates.extend(
            remaining
                .iter()
                .copied()
                .filter(|&u| degree[u] as f64 <= threshold + 1e-9),
        );
        let Some(&chosen) = candidates.choose(rng) else {
            break;
        };
        if engine.is_free(chosen) {
            engine.add(chosen, AddMode::Safe);
        }
        let mut eliminated = vec![chosen];
        eliminated.extend(graph.neighbors(chosen).iter().copied().filter(|&w| alive[w]));
        for r in eliminated {
            if !alive[r] {
                continue;
            }
            alive[r] = false;
            for &w in graph.neighbors(r) {
                if alive[w] {
                    degree[w] -= 1;
                }
            }
        }
        remaining.retain(|&u| alive[u]);
    }
    engine.complete_to_maximal();
    engine
}

/// 随机打乱顶点顺序，每个可加入的顶点以 1/2 的概率加入，最后补全
pub fn random_feasible<'g, R>(graph: &'g Graph, rng: &mut R) -> Membership<'g>
where
    R: Rng + ?Sized,
{
    let mut order: Vec<usize> = (0..graph.n()).collect();
    order.shuffle(rng);
    let mut engine = Membership::new(graph);
    for v in order {
        if engine.is_free(v) && rng.random::<f64>() < 0.5 {
            engine.add(v, AddMode::Safe);
        }
    }
    engine.complete_to_maximal();
    engine
}
