//! mis：最大独立集求解器［命令行版］
//!
//! 用户提供图文件，本程序用模拟退火或遗传算法在给定时间内搜索尽量大的独立集，
//! 每找到更大的解就在标准输出打印一行“大小 秒数”，结束时重复一次最优结果。

use clap::Parser;
use mis::config::Config;
use mis::construct::greedy_by_degree;
use mis::io::{read_graph, read_solution};
use mis::optimizers::AnyTime;
use mis::validate::check;
use mis::{Budget, Command, CommandLine, CommandLineArgs, Error, Graph, Solution};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;
use web_time::{Duration, Instant};

fn run(args: &CommandLineArgs, graph: &Graph, cli: &CommandLine) -> Result<Solution, Error> {
    let config = match &args.command {
        Command::Solve { config } => Config::read(config)?,
        _ => Config::default(),
    };
    let solver = args.command.solver().unwrap_or(config.solver);
    let runtime = args.time.or(config.runtime).unwrap_or(5.0);
    let runtime = Duration::try_from_secs_f64(runtime)
        .map_err(|_| Error::from(format!("运行时间 {runtime} 无效")))?;
    let mut budget = Budget::new(runtime);
    if let Some(steps) = args.steps.or(config.max_steps) {
        budget = budget.with_max_steps(steps);
    }
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    info!("随机种子为 {seed}，运行预算为 {budget:?}");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let outcome = solver.solve(graph, &budget, &mut rng, cli);
    info!("共执行 {} 步", outcome.steps);
    Ok(outcome.best)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = CommandLineArgs::parse();
    let input: PathBuf = args.input.clone().ok_or("必须用 -i 指定图文件")?;
    let graph = read_graph(&input)?;
    let cli = CommandLine::new(args.clone())?;
    let best = match &args.command {
        Command::Validate { solution } => {
            let vertices = read_solution(solution)?;
            check(&graph, &vertices)?;
            println!("解是极大独立集，大小为 {}", vertices.len());
            return Ok(());
        }
        Command::Greedy => {
            let mut anytime = AnyTime::new(&cli, Instant::now());
            anytime.offer(&greedy_by_degree(&graph));
            anytime.finish()
        }
        _ => run(&args, &graph, &cli)?,
    };
    if args.check {
        check(&graph, &best.vertices)?;
        info!("最优解通过校验");
    }
    cli.write_solution(&best)?;
    Ok(())
}
