//! 无向简单图
//!
//! 以邻接表存储，顶点编号为 0..n，构造后不再改变。构造时会去掉自环与重边，因此每个顶点的邻居互不相同且不含自身。

use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
    edges: usize,
}

impl Graph {
    /// 含有 `n` 个孤立顶点的图
    pub fn with_vertices(n: usize) -> Self {
        Self {
            adjacency: vec![vec![]; n],
            edges: 0,
        }
    }

    /// 由边列表构造（0 起始编号，无向），自环与重边会被忽略
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![vec![]; n];
        for &(u, v) in edges {
            assert!(u < n && v < n, "边 ({u}, {v}) 超出顶点范围 0..{n}");
            if u == v {
                continue;
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        let mut total = 0;
        for neighbors in adjacency.iter_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
            total += neighbors.len();
        }
        Self {
            adjacency,
            edges: total / 2,
        }
    }

    /// Erdős–Rényi 随机图 G(n, p)，主要用于测试与基准
    pub fn random<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Self {
        let mut edges = vec![];
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.random::<f64>() < p {
                    edges.push((u, v));
                }
            }
        }
        Self::from_edges(n, &edges)
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.adjacency.len()
    }

    /// 边数（每条边只计一次）
    #[inline]
    pub fn m(&self) -> usize {
        self.edges
    }

    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    pub fn is_adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacency[u].binary_search(&v).is_ok()
    }

    /// 按度数升序排列的顶点，度数相同时编号小者在前
    pub fn ascending_degree_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n()).collect();
        order.sort_by_key(|&v| self.degree(v));
        order
    }
}
