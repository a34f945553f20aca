//! 成员引擎：一个候选解的增量状态
//!
//! 对每个顶点维护是否在解中（`member`）以及冲突数（`conflict`，即已在解中的邻居个数），并缓存解的大小。
//! 所有修改都必须经过本模块的加入、移除、补全与修复操作，从而在任何可观察的时刻都有
//! `conflict[v] == |{u ∈ N(v) : member[u]}|`。
//!
//! 在补全或修复操作返回后，解是独立且极大的：任意两个成员不相邻，任意非成员的冲突数都大于零。
//! 唯一允许暂时破坏独立性的途径是 [`AddMode::Forced`]，它只用于并集杂交，之后必须调用
//! [`Membership::repair_and_complete`]。

use crate::graph::Graph;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// 加入顶点的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMode {
    /// 要求顶点冲突数为零，加入后仍然独立
    Safe,
    /// 允许加入有冲突的顶点，之后必须修复
    Forced,
}

/// 每个引擎自带的工作区，跨调用复用，只通过下标复位
#[derive(Debug, Clone, Default)]
struct Scratch {
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    heap: BinaryHeap<(usize, usize, Reverse<usize>)>,
}

#[derive(Debug, Clone)]
pub struct Membership<'g> {
    graph: &'g Graph,
    member: Vec<bool>,
    conflict: Vec<usize>,
    size: usize,
    scratch: Scratch,
}

impl<'g> Membership<'g> {
    /// 空解
    pub fn new(graph: &'g Graph) -> Self {
        let n = graph.n();
        Self {
            graph,
            member: vec![false; n],
            conflict: vec![0; n],
            size: 0,
            scratch: Scratch {
                queue: VecDeque::new(),
                queued: vec![false; n],
                heap: BinaryHeap::new(),
            },
        }
    }

    /// 由一组顶点构造；使用 [`AddMode::Forced`] 时调用者负责之后修复
    pub fn from_members<I>(graph: &'g Graph, members: I, mode: AddMode) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut engine = Self::new(graph);
        for v in members {
            if !engine.member[v] {
                engine.add(v, mode);
            }
        }
        engine
    }

    #[inline]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_member(&self, v: usize) -> bool {
        self.member[v]
    }

    #[inline]
    pub fn conflict(&self, v: usize) -> usize {
        self.conflict[v]
    }

    /// 不在解中且没有成员邻居，可以安全加入
    #[inline]
    pub fn is_free(&self, v: usize) -> bool {
        !self.member[v] && self.conflict[v] == 0
    }

    /// 成员标记，下标为顶点编号
    pub fn mask(&self) -> &[bool] {
        &self.member
    }

    /// 按编号升序列出所有成员
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.member
            .iter()
            .enumerate()
            .filter_map(|(v, &m)| if m { Some(v) } else { None })
    }

    /// 把 `v` 加入解中，O(deg(v))
    pub fn add(&mut self, v: usize, mode: AddMode) {
        debug_assert!(!self.member[v], "顶点 {v} 已在解中");
        debug_assert!(
            mode == AddMode::Forced || self.conflict[v] == 0,
            "顶点 {v} 有 {} 个成员邻居，不能安全加入",
            self.conflict[v]
        );
        self.member[v] = true;
        self.size += 1;
        for &u in self.graph.neighbors(v) {
            self.conflict[u] += 1;
        }
    }

    /// 把 `v` 从解中移除，O(deg(v))
    pub fn remove(&mut self, v: usize) {
        debug_assert!(self.member[v], "顶点 {v} 不在解中");
        self.member[v] = false;
        self.size -= 1;
        for &u in self.graph.neighbors(v) {
            self.conflict[u] -= 1;
        }
    }

    /// 逐出 `v` 的全部成员邻居后加入 `v`，被逐出的顶点写入 `evicted`
    pub fn swap_in(&mut self, v: usize, evicted: &mut Vec<usize>) {
        debug_assert!(!self.member[v], "顶点 {v} 已在解中");
        evicted.clear();
        let graph = self.graph;
        for &u in graph.neighbors(v) {
            if self.member[u] {
                self.remove(u);
                evicted.push(u);
            }
        }
        self.add(v, AddMode::Safe);
    }

    /// 全局补全：反复扫描所有顶点，加入冲突数为零的非成员，直到一整轮没有加入任何顶点。返回加入的顶点数
    pub fn complete_to_maximal(&mut self) -> usize {
        let mut total = 0;
        loop {
            let mut added = 0;
            for v in 0..self.graph.n() {
                if self.is_free(v) {
                    self.add(v, AddMode::Safe);
                    added += 1;
                }
            }
            total += added;
            if added == 0 {
                return total;
            }
        }
    }

    /// 局部补全：只处理 `frontier` 给出的可能受影响的顶点
    ///
    /// 队列中的顶点若可加入则加入，并把它的邻居入队。以全部顶点为种子时与 [`Self::complete_to_maximal`]
    /// 的结果相同；通常的种子是一次移动所扰动的邻域，代价与该邻域大小成正比。返回加入的顶点数
    pub fn complete_to_maximal_local<I>(&mut self, frontier: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let graph = self.graph;
        for x in frontier {
            if !self.scratch.queued[x] {
                self.scratch.queued[x] = true;
                self.scratch.queue.push_back(x);
            }
        }
        let mut added = 0;
        while let Some(x) = self.scratch.queue.pop_front() {
            self.scratch.queued[x] = false;
            if !self.is_free(x) {
                continue;
            }
            self.add(x, AddMode::Safe);
            added += 1;
            for &w in graph.neighbors(x) {
                if !self.scratch.queued[w] {
                    self.scratch.queued[w] = true;
                    self.scratch.queue.push_back(w);
                }
            }
        }
        added
    }

    /// 修复并补全：用于强制加入之后
    ///
    /// 每次移除冲突数最大的成员；冲突数相同时移除度数较大者，再相同时移除编号较小者。
    /// 移除只会降低其他顶点的冲突数，所以循环次数不超过初始成员数。最后做一次全局补全。返回移除的顶点数
    pub fn repair_and_complete(&mut self) -> usize {
        let graph = self.graph;
        let mut heap = std::mem::take(&mut self.scratch.heap);
        heap.clear();
        for v in 0..graph.n() {
            if self.member[v] && self.conflict[v] > 0 {
                heap.push((self.conflict[v], graph.degree(v), Reverse(v)));
            }
        }
        let mut removed = 0;
        // 堆中记录的冲突数只会比实际值大，弹出的记录若已过期就按实际值放回
        while let Some((recorded, degree, Reverse(v))) = heap.pop() {
            if !self.member[v] || self.conflict[v] == 0 {
                continue;
            }
            if self.conflict[v] != recorded {
                heap.push((self.conflict[v], degree, Reverse(v)));
                continue;
            }
            self.remove(v);
            removed += 1;
        }
        self.scratch.heap = heap;
        self.complete_to_maximal();
        removed
    }

    /// 有成员邻居的成员个数；为零即独立
    pub fn conflicted_members(&self) -> usize {
        (0..self.graph.n())
            .filter(|&v| self.member[v] && self.conflict[v] > 0)
            .count()
    }

    /// 从头重新计算冲突数与大小，检查缓存是否一致
    pub fn is_consistent(&self) -> bool {
        let n = self.graph.n();
        let size = self.member.iter().filter(|&&m| m).count();
        if size != self.size {
            return false;
        }
        (0..n).all(|v| {
            let expected = self
                .graph
                .neighbors(v)
                .iter()
                .filter(|&&u| self.member[u])
                .count();
            expected == self.conflict[v]
        })
    }
}
