use crate::error::Error;
use crate::optimizers::{genetic::Genetic, simulated_annealing::SimulatedAnnealing};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum SolverConfig {
    SimulatedAnnealing(SimulatedAnnealing),
    Genetic(Genetic),
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::SimulatedAnnealing(SimulatedAnnealing::default())
    }
}

/// 求解配置文件
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 运行时间，单位为秒
    pub runtime: Option<f64>,
    pub seed: Option<u64>,
    pub max_steps: Option<u64>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = read_to_string(path)
            .map_err(|e| Error::from(format!("无法读取配置文件 {}：{e}", path.display())))?;
        Self::from_yaml(&content)
    }
}
