use super::{Interface, Message};
use crate::config::SolverConfig;
use crate::error::Error;
use crate::io::write_solution;
use crate::optimizers::genetic::{Genetic, Initialization};
use crate::optimizers::simulated_annealing::{Schedule, SearchOptions, SimulatedAnnealing};
use crate::optimizers::Solution;
use chrono::Local;
use clap::{Parser, Subcommand};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{create_dir_all, File};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 命令行参数的定义
#[derive(Parser, Clone, Debug)]
#[command(name = "mis")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
    /// 图文件，支持 DIMACS 与边列表
    #[arg(short, long, value_name = "FILE", global = true)]
    pub input: Option<PathBuf>,
    /// 运行时间，单位为秒，默认为 5
    #[arg(short, long, global = true)]
    pub time: Option<f64>,
    /// 随机种子，缺省时随机生成
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// 步数上限；与种子一起使用时结果可复现
    #[arg(long, global = true)]
    pub steps: Option<u64>,
    /// 结束时校验最优解是否为极大独立集
    #[arg(long, global = true)]
    pub check: bool,
    /// 把最优解写入文件（1 起始编号，空格分隔）
    #[arg(short, long, value_name = "FILE", global = true)]
    pub out: Option<PathBuf>,
    /// 在 output-<时间> 目录中保存最优解与改进记录
    #[arg(long, global = true)]
    pub save: bool,
    /// 以 JSON 行输出最优值流
    #[arg(long, global = true)]
    pub json: bool,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// 模拟退火
    Anneal {
        /// 初温，默认为 1.0
        #[arg(long)]
        t0: Option<f64>,
        /// 降温系数，默认为 0.999
        #[arg(long)]
        alpha: Option<f64>,
        /// 每个温度下的迭代次数，默认为 max(1000, n)
        #[arg(long)]
        iters_per_t: Option<usize>,
        /// 停滞时逐出部分成员
        #[arg(long)]
        diversify: bool,
        /// 按接受率自适应降温
        #[arg(long)]
        adaptive: bool,
        /// 从候选池中抽样
        #[arg(long)]
        pool: bool,
    },
    /// 遗传算法
    Evolve {
        /// 种群大小，默认为 80
        #[arg(long)]
        pop: Option<usize>,
        /// 杂交率，默认为 0.9
        #[arg(long)]
        pc: Option<f64>,
        /// 变异率，默认为 0.03
        #[arg(long)]
        pm: Option<f64>,
        /// 精英个数，默认为 2
        #[arg(long)]
        elitism: Option<usize>,
        /// 初始种群的构造方式，默认为 mix
        #[arg(long, value_enum)]
        init: Option<Initialization>,
    },
    /// 使用配置文件中的求解方法
    Solve {
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
    /// 按度数升序的确定性贪心
    Greedy,
    /// 校验一个 1 起始编号的解文件
    Validate {
        #[arg(long, value_name = "FILE")]
        solution: PathBuf,
    },
}

impl Command {
    /// 由命令行参数构造求解方法；`solve`、`greedy`、`validate` 没有对应的求解方法
    pub fn solver(&self) -> Option<SolverConfig> {
        match self {
            Command::Anneal {
                t0,
                alpha,
                iters_per_t,
                diversify,
                adaptive,
                pool,
            } => {
                let default = Schedule::default();
                Some(SolverConfig::SimulatedAnnealing(SimulatedAnnealing {
                    parameters: Some(Schedule {
                        t0: t0.unwrap_or(default.t0),
                        alpha: alpha.unwrap_or(default.alpha),
                        block: *iters_per_t,
                    }),
                    options: Some(SearchOptions {
                        diversify: *diversify,
                        adaptive_temperature: *adaptive,
                        candidate_pool: *pool,
                    }),
                    ..Default::default()
                }))
            }
            Command::Evolve {
                pop,
                pc,
                pm,
                elitism,
                init,
            } => Some(SolverConfig::Genetic(Genetic {
                population_size: *pop,
                crossover_rate: *pc,
                mutation_rate: *pm,
                elitism: *elitism,
                init: *init,
                ..Default::default()
            })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct TraceRecord {
    event: &'static str,
    best_size: usize,
    elapsed: f64,
}

/// 通过命令行来使用求解器的入口，实现了界面特征
///
/// 标准输出只有最优值流，其余消息交给 tracing 写到标准错误
pub struct CommandLine {
    pub args: CommandLineArgs,
    pub output_dir: Option<PathBuf>,
    trace: Option<RefCell<Writer<File>>>,
}

impl CommandLine {
    pub fn new(args: CommandLineArgs) -> Result<Self, Error> {
        let output_dir = if args.save {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            let dir = PathBuf::from(format!("output-{time}"));
            create_dir_all(&dir)?;
            Some(dir)
        } else {
            None
        };
        let trace = match &output_dir {
            Some(dir) => Some(RefCell::new(
                WriterBuilder::new()
                    .delimiter(b'\t')
                    .from_path(dir.join("trace.tsv"))?,
            )),
            None => None,
        };
        Ok(Self {
            args,
            output_dir,
            trace,
        })
    }

    /// 按 `--out` 与 `--save` 保存最优解
    pub fn write_solution(&self, solution: &Solution) -> Result<(), Error> {
        if let Some(path) = &self.args.out {
            write_solution(path, &solution.vertices)?;
            info!("最优解已写入 {}", path.display());
        }
        if let Some(dir) = &self.output_dir {
            let path = dir.join("solution.txt");
            write_solution(&path, &solution.vertices)?;
            info!("最优解与改进记录保存在 {} 中", dir.display());
        }
        Ok(())
    }

    fn anytime(&self, message: &Message, event: &'static str, best_size: usize, elapsed: f64) {
        if self.args.json {
            match serde_json::to_string(message) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("无法序列化消息：{e}"),
            }
        } else {
            println!("{best_size} {elapsed:.6}");
        }
        if let Some(trace) = &self.trace {
            let mut writer = trace.borrow_mut();
            let result = writer
                .serialize(TraceRecord {
                    event,
                    best_size,
                    elapsed,
                })
                .map_err(Error::from)
                .and_then(|_| writer.flush().map_err(Error::from));
            if let Err(e) = result {
                warn!("无法写入改进记录：{e}");
            }
        }
    }
}

impl Interface for CommandLine {
    fn send(&self, message: Message) {
        match message {
            Message::Improvement { best_size, elapsed } => {
                self.anytime(&message, "improvement", best_size, elapsed)
            }
            Message::Final { best_size, elapsed } => {
                self.anytime(&message, "final", best_size, elapsed)
            }
            Message::Progress {
                steps,
                temperature,
                accept_rate,
                current_size,
                best_size,
            } => debug!(
                "已执行 {steps} 步，温度为 {temperature:.2e}，接受率为 {:.2}%，当前 {current_size}，最优 {best_size}",
                accept_rate * 100.0
            ),
            Message::Diversified { evicted, size } => {
                info!("搜索停滞，逐出 {evicted} 个成员，当前大小为 {size}")
            }
            Message::Generation {
                generation,
                best_size,
                mean_size,
                restarted,
            } => {
                debug!("第 {generation} 代：最优 {best_size}，平均 {mean_size:.2}");
                if restarted {
                    info!("第 {generation} 代重新生成了非精英个体");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anneal_flags_become_solver_config() {
        let args = CommandLineArgs::parse_from([
            "mis", "anneal", "-i", "g.txt", "--t0", "2", "--iters-per-t", "500", "--pool", "--seed", "3",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("g.txt")));
        assert_eq!(args.seed, Some(3));
        let Some(SolverConfig::SimulatedAnnealing(sa)) = args.command.solver() else {
            panic!("应当是退火算法");
        };
        let schedule = sa.parameters.unwrap();
        assert_eq!((schedule.t0, schedule.alpha, schedule.block), (2.0, 0.999, Some(500)));
        let options = sa.options.unwrap();
        assert!(options.candidate_pool && !options.diversify && !options.adaptive_temperature);
    }

    #[test]
    fn evolve_flags_become_solver_config() {
        let args = CommandLineArgs::parse_from(["mis", "-i", "g.txt", "evolve", "--pop", "10", "--init", "random"]);
        let Some(SolverConfig::Genetic(ga)) = args.command.solver() else {
            panic!("应当是遗传算法");
        };
        assert_eq!(ga.population_size, Some(10));
        assert_eq!(ga.init, Some(Initialization::Random));
        assert!(ga.crossover_rate.is_none());
    }

    #[test]
    fn other_commands_have_no_solver() {
        let args = CommandLineArgs::parse_from(["mis", "greedy", "-i", "g.txt"]);
        assert!(args.command.solver().is_none());
        assert!(!args.save && !args.json && args.time.is_none());
    }
}
