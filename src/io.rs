//! 图文件与解文件的读写
//!
//! 支持的图格式：
//! - DIMACS：`p edge n m`（或 `p edges`），之后为 `e u v`、`a u v` 或裸的 `u v`
//! - 首行为 `n` 或 `n m`，之后每行一条边
//! - 只有边的列表
//!
//! 以 `c`、`#`、`%` 开头的行是注释。只要有端点为 0 就按 0 起始编号，否则按 1 起始。
//! 没有声明顶点数时取最大编号推断。自环、重边和超出范围的端点都被丢弃。

use crate::error::Error;
use crate::graph::Graph;
use itertools::Itertools;
use std::fs::{read_to_string, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

fn parse_number(token: &str, line: usize) -> Result<u64, Error> {
    token
        .parse()
        .map_err(|_| Error::from(format!("第 {line} 行无法解析“{token}”")))
}

fn is_comment(line: &str) -> bool {
    line.starts_with('c') || line.starts_with('#') || line.starts_with('%')
}

/// 从任意输入流中读取图
pub fn parse_graph<R: BufRead>(reader: R) -> Result<Graph, Error> {
    let mut declared: Option<u64> = None;
    let mut dimacs = false;
    // 首行若恰有两个数，暂时记下，等读完再判断它是 `n m` 还是一条边
    let mut pending_header: Option<(u64, u64)> = None;
    let mut first_data_line = true;
    let mut pairs: Vec<(u64, u64)> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let line = line.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[0] {
            "p" => {
                let n = tokens
                    .get(2)
                    .ok_or_else(|| Error::from(format!("第 {number} 行的 DIMACS 头不完整")))?;
                declared = Some(parse_number(n, number)?);
                dimacs = true;
                first_data_line = false;
                continue;
            }
            "e" | "a" => {
                tokens.remove(0);
            }
            _ => {}
        }
        let values: Vec<u64> = tokens
            .iter()
            .map(|t| parse_number(t, number))
            .collect::<Result<_, _>>()?;
        if first_data_line {
            first_data_line = false;
            match values[..] {
                [n] => {
                    declared = Some(n);
                    continue;
                }
                [a, b] => {
                    pending_header = Some((a, b));
                    continue;
                }
                [n, _, ..] => {
                    declared = Some(n);
                    continue;
                }
                [] => {}
            }
        }
        match values[..] {
            [u, v, ..] => pairs.push((u, v)),
            _ => return Err(format!("第 {number} 行不是一条边").into()),
        }
    }

    if let Some((a, b)) = pending_header {
        let fits = pairs.iter().all(|&(u, v)| u.max(v) <= a);
        if !dimacs && b == pairs.len() as u64 && fits {
            declared = Some(a);
        } else {
            pairs.insert(0, (a, b));
        }
    }
    if declared.is_none() && pairs.is_empty() {
        return Err("图文件为空，既没有顶点数也没有边".into());
    }

    let one_based = !pairs.iter().any(|&(u, v)| u == 0 || v == 0);
    let shift = u64::from(one_based);
    let inferred = pairs.iter().map(|&(u, v)| u.max(v)).max().map_or(0, |m| m + 1 - shift);
    let n = declared.unwrap_or(inferred) as usize;
    let mut dropped = 0;
    let edges: Vec<(usize, usize)> = pairs
        .iter()
        .filter_map(|&(u, v)| {
            let (u, v) = ((u - shift) as usize, (v - shift) as usize);
            if u < n && v < n {
                Some((u, v))
            } else {
                dropped += 1;
                None
            }
        })
        .collect();
    if dropped > 0 {
        debug!("丢弃了 {dropped} 条端点超出范围的边");
    }
    debug!(
        "按 {} 起始编号读取了 {} 个端点对",
        if one_based { 1 } else { 0 },
        pairs.len()
    );
    Ok(Graph::from_edges(n, &edges))
}

/// 读取图文件
pub fn read_graph(path: &Path) -> Result<Graph, Error> {
    let file = File::open(path)
        .map_err(|e| Error::from(format!("无法打开图文件 {}：{e}", path.display())))?;
    let graph = parse_graph(BufReader::new(file))?;
    info!(
        "已读取图 {}：{} 个顶点，{} 条边",
        path.display(),
        graph.n(),
        graph.m()
    );
    Ok(graph)
}

/// 把解写成一行以空格分隔的 1 起始编号
pub fn format_solution(vertices: &[usize]) -> String {
    vertices.iter().map(|v| v + 1).join(" ")
}

pub fn write_solution(path: &Path, vertices: &[usize]) -> Result<(), Error> {
    std::fs::write(path, format_solution(vertices) + "\n")?;
    Ok(())
}

/// 读取 1 起始编号的解文件，返回 0 起始的顶点列表
pub fn read_solution(path: &Path) -> Result<Vec<usize>, Error> {
    let content = read_to_string(path)
        .map_err(|e| Error::from(format!("无法读取解文件 {}：{e}", path.display())))?;
    parse_solution(&content)
}

pub fn parse_solution(content: &str) -> Result<Vec<usize>, Error> {
    content
        .split_whitespace()
        .map(|token| match token.parse::<usize>() {
            Ok(v) if v >= 1 => Ok(v - 1),
            _ => Err(Error::from(format!("解文件中的“{token}”不是正整数"))),
        })
        .collect()
}
