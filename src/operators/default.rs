use super::{Crossover, Mutate};
use crate::engine::{AddMode, Membership};
use rand::Rng;

/// 默认算子：按比例在并集修复与交集偏置两种杂交之间选择，变异为温和的随机加入与移除
#[derive(Debug, Clone, Copy)]
pub struct DefaultOperators {
    /// 选择并集杂交的概率
    pub union_bias: f64,
    /// 变异时每次试验取到成员后将其移除的概率
    pub removal_probability: f64,
    /// 决定变异试验次数 max(1, round(pm · n))
    pub mutation_rate: f64,
}

impl Default for DefaultOperators {
    fn default() -> Self {
        Self {
            union_bias: 0.5,
            removal_probability: 0.2,
            mutation_rate: 0.03,
        }
    }
}

impl Crossover for DefaultOperators {
    fn crossover<'g, R: Rng + ?Sized>(
        &self,
        a: &Membership<'g>,
        b: &Membership<'g>,
        rng: &mut R,
    ) -> Membership<'g> {
        if rng.random::<f64>() < self.union_bias {
            union_repair(a, b)
        } else {
            intersection_biased(a, b)
        }
    }
}

impl Mutate for DefaultOperators {
    fn mutate<R: Rng + ?Sized>(&self, child: &mut Membership, rng: &mut R) -> usize {
        let graph = child.graph();
        let n = graph.n();
        if n == 0 {
            return 0;
        }
        let trials = ((self.mutation_rate * n as f64).round() as usize).max(1);
        let mut removed = Vec::new();
        let mut changes = 0;
        for _ in 0..trials {
            let v = rng.random_range(0..n);
            if child.is_member(v) {
                if rng.random::<f64>() < self.removal_probability {
                    child.remove(v);
                    removed.push(v);
                    changes += 1;
                }
            } else if child.is_free(v) {
                child.add(v, AddMode::Safe);
                changes += 1;
            }
        }
        let frontier = removed
            .iter()
            .flat_map(|&u| std::iter::once(u).chain(graph.neighbors(u).iter().copied()));
        changes + child.complete_to_maximal_local(frontier)
    }
}

/// 并集修复：把两个亲本的成员全部强制加入，再修复冲突并补全
pub fn union_repair<'g>(a: &Membership<'g>, b: &Membership<'g>) -> Membership<'g> {
    let mut child = a.clone();
    for v in b.members() {
        if !child.is_member(v) {
            child.add(v, AddMode::Forced);
        }
    }
    child.repair_and_complete();
    child
}

/// 交集偏置：保留两个亲本共有的成员，再按度数升序尝试加入只属于一方的成员
///
/// 结束前以“属于某个亲本但不在子代中的顶点及其邻居”为种子做局部补全。
/// 不属于任何亲本的顶点在两个亲本中都有成员邻居，这些邻居若不在子代中就已在种子里，所以结果是极大的
pub fn intersection_biased<'g>(a: &Membership<'g>, b: &Membership<'g>) -> Membership<'g> {
    let graph = a.graph();
    let mut child = Membership::new(graph);
    let mut candidates = Vec::new();
    for v in a.members() {
        if b.is_member(v) {
            child.add(v, AddMode::Safe);
        } else {
            candidates.push(v);
        }
    }
    candidates.extend(b.members().filter(|&v| !a.is_member(v)));
    candidates.sort_by_key(|&v| (graph.degree(v), v));
    for &v in &candidates {
        if child.is_free(v) {
            child.add(v, AddMode::Safe);
        }
    }
    let mut frontier = Vec::new();
    for &u in &candidates {
        if !child.is_member(u) {
            frontier.push(u);
            frontier.extend_from_slice(graph.neighbors(u));
        }
    }
    child.complete_to_maximal_local(frontier);
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::random_feasible;
    use crate::graph::Graph;
    use crate::validate::{is_independent, is_maximal};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn path() -> Graph {
        Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)])
    }

    fn assert_valid(engine: &Membership) {
        let g = engine.graph();
        assert!(engine.is_consistent());
        assert!(is_independent(g, engine.mask()));
        assert!(is_maximal(g, engine.mask()));
    }

    #[test]
    fn union_of_complementary_parents() {
        let g = path();
        let a = Membership::from_members(&g, [0, 2, 4], AddMode::Safe);
        let b = Membership::from_members(&g, [1, 3], AddMode::Safe);
        let child = union_repair(&a, &b);
        assert_valid(&child);
        assert_eq!(child.members().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn intersection_prefers_low_degree() {
        let g = path();
        let a = Membership::from_members(&g, [0, 2, 4], AddMode::Safe);
        let b = Membership::from_members(&g, [0, 3], AddMode::Safe);
        let child = intersection_biased(&a, &b);
        assert_valid(&child);
        assert_eq!(child.members().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn operators_preserve_maximal_independence() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let g = Graph::random(80, 0.08, &mut rng);
        let operators = DefaultOperators {
            mutation_rate: 0.1,
            ..Default::default()
        };
        for _ in 0..50 {
            let a = random_feasible(&g, &mut rng);
            let b = random_feasible(&g, &mut rng);
            let mut child = operators.crossover(&a, &b, &mut rng);
            assert_valid(&child);
            assert_valid(&intersection_biased(&a, &b));
            assert_valid(&union_repair(&a, &b));
            operators.mutate(&mut child, &mut rng);
            assert_valid(&child);
        }
    }

    #[test]
    fn mutation_on_empty_graph_is_noop() {
        let g = Graph::with_vertices(0);
        let mut child = Membership::new(&g);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(DefaultOperators::default().mutate(&mut child, &mut rng), 0);
    }
}
