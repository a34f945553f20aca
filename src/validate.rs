//! 解的校验：独立性与极大性

use crate::error::Error;
use crate::graph::Graph;

/// 解中任意两个顶点都不相邻
pub fn is_independent(graph: &Graph, mask: &[bool]) -> bool {
    (0..graph.n()).all(|u| !mask[u] || graph.neighbors(u).iter().all(|&v| !mask[v]))
}

/// 解外的每个顶点都至少有一个邻居在解中
pub fn is_maximal(graph: &Graph, mask: &[bool]) -> bool {
    (0..graph.n()).all(|u| mask[u] || graph.neighbors(u).iter().any(|&v| mask[v]))
}

/// 把顶点列表（0 起始）转换为成员标记
///
/// # Errors
/// 顶点编号超出范围或重复时返回错误
pub fn mask_from_vertices(graph: &Graph, vertices: &[usize]) -> Result<Vec<bool>, Error> {
    let mut mask = vec![false; graph.n()];
    for &v in vertices {
        if v >= graph.n() {
            return Err(format!("顶点 {v} 超出范围 0..{}", graph.n()).into());
        }
        if mask[v] {
            return Err(format!("顶点 {v} 重复出现").into());
        }
        mask[v] = true;
    }
    Ok(mask)
}

/// 校验一个解是否为极大独立集
///
/// # Errors
/// 返回的错误说明违反了哪一条性质
pub fn check(graph: &Graph, vertices: &[usize]) -> Result<(), Error> {
    let mask = mask_from_vertices(graph, vertices)?;
    let independent = is_independent(graph, &mask);
    let maximal = is_maximal(graph, &mask);
    match (independent, maximal) {
        (true, true) => Ok(()),
        (false, true) => Err("解不是独立集".into()),
        (true, false) => Err("解不是极大的".into()),
        (false, false) => Err("解既不是独立集，也不是极大的".into()),
    }
}
